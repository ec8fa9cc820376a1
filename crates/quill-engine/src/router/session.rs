use std::collections::{HashMap, HashSet};

use crate::coords::Vec2;
use crate::ink::{StrokeId, StrokePoint, StrokeStyle};
use crate::input::PointerId;
use crate::render::HoverPreview;

/// What a contact is doing for the rest of its gesture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerMode {
    Draw,
    Erase,
}

/// In-progress capture for one drawing pointer.
#[derive(Debug, Clone)]
pub(crate) struct ActiveCapture {
    pub stroke_id: StrokeId,
    pub style: StrokeStyle,
    /// Authoritative raw points. Predicted samples never land here.
    pub points: Vec<StrokePoint>,
}

impl ActiveCapture {
    /// Appends `point` unless it repeats the last position, in which case the
    /// last sample's pressure and time are refreshed. Returns whether a new
    /// point was added.
    pub fn push(&mut self, point: StrokePoint) -> bool {
        match self.points.last_mut() {
            Some(last) if last.same_position(&point) => {
                last.pressure = point.pressure.or(last.pressure);
                last.t = point.t;
                false
            }
            _ => {
                self.points.push(point);
                true
            }
        }
    }
}

/// Pinch reference: the two pointers being tracked and their last spread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct PinchBaseline {
    pub a: PointerId,
    pub b: PointerId,
    pub distance: f32,
    pub centroid: Vec2,
}

/// Bookkeeping for the multi-finger tap shortcut.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct TapCandidate {
    pub start_ms: u64,
    pub start_centroid: Vec2,
    pub max_pointers: usize,
    pub max_movement: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct PanSession {
    pub pointer: PointerId,
    pub start: Vec2,
    pub last: Vec2,
    pub max_travel: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct TapRecord {
    pub time_ms: u64,
    pub pos: Vec2,
}

/// Every piece of per-pointer and per-gesture state the router keeps.
///
/// Owned by one router and touched only from the input thread.
#[derive(Debug, Default)]
pub struct PointerSessionTable {
    pub(crate) captures: HashMap<PointerId, ActiveCapture>,
    pub(crate) modes: HashMap<PointerId, PointerMode>,
    pub(crate) predicted: HashMap<PointerId, StrokeId>,
    pub(crate) eraser_trail: HashMap<PointerId, Vec2>,
    pub(crate) long_hold_start: HashMap<PointerId, u64>,
    pub(crate) long_hold_active: HashSet<PointerId>,
    pub(crate) transforming: bool,
    pub(crate) pinch: Option<PinchBaseline>,
    pub(crate) tap: Option<TapCandidate>,
    pub(crate) pan: Option<PanSession>,
    pub(crate) last_tap: Option<TapRecord>,
    pub(crate) hover: Option<HoverPreview>,
    pub(crate) button_eraser_active: bool,
}

impl PointerSessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no per-pointer map mentions `id`.
    pub fn is_pointer_clear(&self, id: PointerId) -> bool {
        !self.captures.contains_key(&id)
            && !self.modes.contains_key(&id)
            && !self.predicted.contains_key(&id)
            && !self.eraser_trail.contains_key(&id)
            && !self.long_hold_start.contains_key(&id)
            && !self.long_hold_active.contains(&id)
    }

    /// True when no per-pointer map has any entry.
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
            && self.modes.is_empty()
            && self.predicted.is_empty()
            && self.eraser_trail.is_empty()
            && self.long_hold_start.is_empty()
            && self.long_hold_active.is_empty()
    }

    pub fn mode(&self, id: PointerId) -> Option<PointerMode> {
        self.modes.get(&id).copied()
    }

    pub fn active_stroke(&self, id: PointerId) -> Option<StrokeId> {
        self.captures.get(&id).map(|c| c.stroke_id)
    }

    pub fn predicted_stroke(&self, id: PointerId) -> Option<StrokeId> {
        self.predicted.get(&id).copied()
    }

    /// Raw points buffered for `id`'s in-progress stroke.
    pub fn buffered_points(&self, id: PointerId) -> Option<&[StrokePoint]> {
        self.captures.get(&id).map(|c| c.points.as_slice())
    }

    pub fn hover(&self) -> Option<HoverPreview> {
        self.hover
    }

    pub fn is_button_eraser_active(&self) -> bool {
        self.button_eraser_active
    }

    pub(crate) fn any_erasing(&self) -> bool {
        self.modes.values().any(|m| *m == PointerMode::Erase)
    }

    /// Forgets everything about `id` except long-hold tracking.
    pub(crate) fn forget_pointer(&mut self, id: PointerId) {
        self.captures.remove(&id);
        self.modes.remove(&id);
        self.predicted.remove(&id);
        self.eraser_trail.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> ActiveCapture {
        ActiveCapture {
            stroke_id: StrokeId::new(),
            style: StrokeStyle::default(),
            points: vec![StrokePoint::at(1.0, 1.0, 0).with_pressure(0.2)],
        }
    }

    #[test]
    fn repeated_position_refreshes_last_point() {
        let mut c = capture();
        assert!(!c.push(StrokePoint::at(1.0, 1.0, 5).with_pressure(0.8)));
        assert_eq!(c.points.len(), 1);
        assert_eq!(c.points[0].pressure, Some(0.8));
        assert_eq!(c.points[0].t, 5);
        assert!(c.push(StrokePoint::at(2.0, 1.0, 6)));
        assert_eq!(c.points.len(), 2);
    }

    #[test]
    fn forget_clears_every_map() {
        let mut t = PointerSessionTable::new();
        let id = PointerId(3);
        t.captures.insert(id, capture());
        t.modes.insert(id, PointerMode::Draw);
        t.predicted.insert(id, StrokeId::new());
        t.eraser_trail.insert(id, Vec2::zero());
        assert!(!t.is_pointer_clear(id));
        t.forget_pointer(id);
        assert!(t.is_pointer_clear(id));
        assert!(t.is_empty());
    }
}
