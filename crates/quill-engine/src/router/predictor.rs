use std::collections::HashMap;

use log::debug;

use crate::coords::Vec2;
use crate::input::{PointerAction, PointerEvent, PointerId};

/// How far ahead the linear predictor extrapolates.
pub const PREDICTION_HORIZON_MS: u64 = 16;

/// Source of best-guess future samples for the predicted-tail overlay.
///
/// Resolved once at startup; the router never probes for it per event.
pub trait MotionPredictor {
    /// Feeds one real event, including its batched history.
    fn record(&mut self, event: &PointerEvent);

    /// A synthetic `Move` event one horizon ahead, if there is enough data.
    fn predict(&self) -> Option<PointerEvent>;

    fn reset(&mut self);
}

/// The unavailable predictor: never predicts.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoMotionPredictor;

impl MotionPredictor for NoMotionPredictor {
    fn record(&mut self, _event: &PointerEvent) {}

    fn predict(&self) -> Option<PointerEvent> {
        None
    }

    fn reset(&mut self) {}
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Timed {
    pos: Vec2,
    t: u64,
}

#[derive(Debug, Clone, Default)]
struct Track {
    prev: Option<Timed>,
    last: Option<Timed>,
}

impl Track {
    fn push(&mut self, sample: Timed) {
        if self.last.is_some_and(|l| l.t == sample.t) {
            self.last = Some(sample);
            return;
        }
        self.prev = self.last.replace(sample);
    }

    fn extrapolate(&self, horizon: u64) -> Option<(Vec2, u64)> {
        let (prev, last) = (self.prev?, self.last?);
        let dt = last.t.checked_sub(prev.t).filter(|dt| *dt > 0)?;
        let velocity = (last.pos - prev.pos) / dt as f32;
        Some((last.pos + velocity * horizon as f32, last.t + horizon))
    }
}

/// The available predictor: extrapolates each pointer's last two samples.
#[derive(Debug, Clone, Default)]
pub struct LinearMotionPredictor {
    tracks: HashMap<PointerId, Track>,
    template: Option<PointerEvent>,
}

impl LinearMotionPredictor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotionPredictor for LinearMotionPredictor {
    fn record(&mut self, event: &PointerEvent) {
        match event.action {
            PointerAction::Cancel => {
                self.reset();
                return;
            }
            PointerAction::Up => {
                if let Some(p) = event.action_pointer() {
                    self.tracks.remove(&p.id);
                }
                if event.pointer_count() <= 1 {
                    self.reset();
                }
                return;
            }
            PointerAction::Down | PointerAction::Move => {}
            _ => return,
        }

        for p in &event.pointers {
            let track = self.tracks.entry(p.id).or_default();
            for h in &p.history {
                track.push(Timed { pos: Vec2::new(h.x, h.y), t: h.time_ms });
            }
            track.push(Timed { pos: p.pos(), t: event.time_ms });
        }
        self.template = Some(event.clone());
    }

    fn predict(&self) -> Option<PointerEvent> {
        let template = self.template.as_ref()?;
        let mut latest = template.time_ms;
        let mut pointers = Vec::with_capacity(template.pointers.len());
        for p in &template.pointers {
            let Some((pos, t)) = self.tracks.get(&p.id).and_then(|tr| tr.extrapolate(PREDICTION_HORIZON_MS)) else {
                continue;
            };
            let mut predicted = p.clone();
            predicted.x = pos.x;
            predicted.y = pos.y;
            predicted.history.clear();
            latest = latest.max(t);
            pointers.push(predicted);
        }
        if pointers.is_empty() {
            return None;
        }
        Some(
            PointerEvent::new(PointerAction::Move, pointers, latest)
                .with_buttons(template.buttons)
                .with_source(template.source),
        )
    }

    fn reset(&mut self) {
        self.tracks.clear();
        self.template = None;
    }
}

/// Picks the predictor implementation for this session.
pub fn resolve_motion_predictor(enabled: bool) -> Box<dyn MotionPredictor> {
    if enabled {
        debug!("motion prediction: linear, {PREDICTION_HORIZON_MS} ms horizon");
        Box::new(LinearMotionPredictor::new())
    } else {
        debug!("motion prediction unavailable");
        Box::new(NoMotionPredictor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerSample, ToolHint};

    fn ev(action: PointerAction, x: f32, y: f32, t: u64) -> PointerEvent {
        PointerEvent::new(action, vec![PointerSample::new(PointerId(1), x, y, ToolHint::Stylus)], t)
    }

    #[test]
    fn needs_two_samples() {
        let mut p = LinearMotionPredictor::new();
        p.record(&ev(PointerAction::Down, 0.0, 0.0, 100));
        assert!(p.predict().is_none());
    }

    #[test]
    fn extrapolates_one_horizon_ahead() {
        let mut p = LinearMotionPredictor::new();
        p.record(&ev(PointerAction::Down, 0.0, 0.0, 100));
        p.record(&ev(PointerAction::Move, 8.0, 4.0, 108));
        let predicted = p.predict().expect("prediction");
        assert_eq!(predicted.action, PointerAction::Move);
        assert_eq!(predicted.time_ms, 124);
        let s = &predicted.pointers[0];
        assert!((s.x - 24.0).abs() < 1e-4 && (s.y - 12.0).abs() < 1e-4);
    }

    #[test]
    fn up_and_cancel_forget_tracks() {
        let mut p = LinearMotionPredictor::new();
        p.record(&ev(PointerAction::Down, 0.0, 0.0, 100));
        p.record(&ev(PointerAction::Move, 8.0, 4.0, 108));
        p.record(&ev(PointerAction::Up, 8.0, 4.0, 110));
        assert!(p.predict().is_none());

        p.record(&ev(PointerAction::Down, 0.0, 0.0, 200));
        p.record(&ev(PointerAction::Move, 2.0, 0.0, 204));
        p.record(&ev(PointerAction::Cancel, 2.0, 0.0, 205));
        assert!(p.predict().is_none());
    }

    #[test]
    fn unavailable_never_predicts() {
        let mut p = resolve_motion_predictor(false);
        p.record(&ev(PointerAction::Down, 0.0, 0.0, 100));
        p.record(&ev(PointerAction::Move, 8.0, 4.0, 108));
        assert!(p.predict().is_none());
    }
}
