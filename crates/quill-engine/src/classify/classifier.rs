use std::collections::HashSet;

use crate::input::{PointerEvent, PointerId, PointerSample, SourceHint, ToolHint};

/// Axis values at or below this are treated as "not reported".
const AXIS_EPSILON: f32 = 0.001;

/// Unknown pointers with orientation only count as stylus-like when their
/// contact is at most this large.
const UNKNOWN_STYLUS_SIZE_MAX: f32 = 0.08;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerKind {
    Stylus,
    Finger,
    Unknown,
}

/// Classifier verdict for one pointer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PointerClass {
    pub kind: PointerKind,
    /// The stylus reports its eraser end.
    pub eraser_tip: bool,
}

impl PointerClass {
    pub fn is_stylus(self) -> bool {
        self.kind == PointerKind::Stylus
    }

    pub fn is_finger(self) -> bool {
        self.kind == PointerKind::Finger
    }
}

/// Decides stylus vs finger per pointer, remembering stylus verdicts for
/// the lifetime of each pointer id.
#[derive(Debug, Default)]
pub struct PointerClassifier {
    sticky: HashSet<PointerId>,
}

impl PointerClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `sample` (one of `event`'s pointers) and latches stylus
    /// verdicts so the pointer stays a stylus until [`release`](Self::release).
    pub fn classify(&mut self, event: &PointerEvent, sample: &PointerSample) -> PointerClass {
        let class = self.peek(event, sample);
        if class.is_stylus() {
            self.sticky.insert(sample.id);
        }
        class
    }

    /// Like [`classify`](Self::classify) without latching.
    pub fn peek(&self, event: &PointerEvent, sample: &PointerSample) -> PointerClass {
        let eraser_tip = sample.tool == ToolHint::Eraser;
        let kind = match sample.tool {
            ToolHint::Stylus | ToolHint::Eraser => PointerKind::Stylus,
            ToolHint::Finger => PointerKind::Finger,
            ToolHint::Unknown => {
                if unknown_is_stylus_like(sample)
                    || self.sticky.contains(&sample.id)
                    || event.source == SourceHint::Stylus
                    || event.buttons.any()
                {
                    PointerKind::Stylus
                } else {
                    PointerKind::Unknown
                }
            }
        };
        PointerClass { kind, eraser_tip }
    }

    /// True when any pointer of `event` is a stylus, or a stylus is still latched.
    pub fn has_stylus_stream(&self, event: &PointerEvent) -> bool {
        !self.sticky.is_empty() || event.pointers.iter().any(|p| self.peek(event, p).is_stylus())
    }

    pub fn is_sticky(&self, id: PointerId) -> bool {
        self.sticky.contains(&id)
    }

    /// Forgets the latched verdict for `id` (pointer up).
    pub fn release(&mut self, id: PointerId) {
        self.sticky.remove(&id);
    }

    pub fn clear(&mut self) {
        self.sticky.clear();
    }
}

fn unknown_is_stylus_like(sample: &PointerSample) -> bool {
    sample.distance > AXIS_EPSILON
        || sample.tilt.abs() > AXIS_EPSILON
        || (sample.orientation.abs() > AXIS_EPSILON && sample.size <= UNKNOWN_STYLUS_SIZE_MAX)
}

/// Every pointer in `event` explicitly reports a finger. Empty events are not.
pub fn event_is_finger_only(event: &PointerEvent) -> bool {
    !event.pointers.is_empty() && event.pointers.iter().all(|p| p.tool == ToolHint::Finger)
}
