//! Finger navigation: pinch-zoom, two-finger pan, one-finger pan, and the
//! tap shortcuts that ride on them.

use log::{debug, trace};

use crate::classify::event_is_finger_only;
use crate::coords::Vec2;
use crate::input::{PointerAction, PointerEvent};
use crate::render::RenderCommand;

use super::gesture_router::{GestureRouter, RouterCtx};
use super::listener::{InkListener, TransformGesture};
use super::session::{PanSession, PinchBaseline, TapCandidate, TapRecord};
use super::settings::MultiFingerTapAction;

pub const MIN_ZOOM_CHANGE: f32 = 0.5;
pub const MAX_ZOOM_CHANGE: f32 = 2.0;

/// Pinch steps smaller than this in both zoom and pan are held back.
const PINCH_PAN_NOISE_PX: f32 = 0.35;
const PINCH_ZOOM_NOISE: f32 = 0.0025;

const DOUBLE_TAP_TIMEOUT_MS: u64 = 280;
const DOUBLE_TAP_SLOP_PX: f32 = 28.0;
const MULTI_TAP_TIMEOUT_MS: u64 = 260;
const MULTI_TAP_SLOP_PX: f32 = 24.0;

impl GestureRouter {
    pub(super) fn handle_transform(
        &mut self,
        event: &PointerEvent,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) -> bool {
        match event.action {
            PointerAction::Down => {
                if !event_is_finger_only(event) {
                    return false;
                }
                if self.sessions.transforming {
                    self.sessions.pinch = pinch_baseline(event, None);
                    if let Some(tap) = self.sessions.tap.as_mut() {
                        tap.max_pointers = tap.max_pointers.max(event.pointer_count());
                    }
                } else {
                    self.begin_transform(event);
                }
                true
            }
            PointerAction::Move => {
                if event.pointer_count() >= 2 {
                    self.update_transform(event, ctx, listener);
                }
                true
            }
            PointerAction::Up => {
                let remaining = event.pointer_count().saturating_sub(1);
                if remaining >= 2 {
                    self.sessions.pinch = pinch_baseline(event, Some(event.action_index));
                    trace!("pinch re-baselined on {remaining} pointers");
                } else {
                    self.end_transform(event.time_ms, listener, true);
                }
                true
            }
            PointerAction::Cancel => {
                self.cancel_all(listener);
                true
            }
            PointerAction::HoverEnter | PointerAction::HoverMove | PointerAction::HoverExit => true,
        }
    }

    fn begin_transform(&mut self, event: &PointerEvent) {
        self.sessions.pan = None;
        self.cancel_all_strokes();
        self.predictor.reset();
        self.set_hover(None);

        let pinch = pinch_baseline(event, None);
        let s = &mut self.sessions;
        s.transforming = true;
        s.pinch = pinch;
        s.tap = pinch.map(|p| TapCandidate {
            start_ms: event.time_ms,
            start_centroid: p.centroid,
            max_pointers: event.pointer_count(),
            max_movement: 0.0,
        });
        debug!("transform begin ({} pointers)", event.pointer_count());
    }

    fn update_transform(&mut self, event: &PointerEvent, ctx: &mut RouterCtx<'_>, listener: &mut dyn InkListener) {
        let Some(base) = self.sessions.pinch else {
            self.sessions.pinch = pinch_baseline(event, None);
            return;
        };
        let (Some(a), Some(b)) = (event.pointer(base.a), event.pointer(base.b)) else {
            self.sessions.pinch = pinch_baseline(event, None);
            return;
        };
        let centroid = a.pos().midpoint(b.pos());
        let distance = a.pos().distance(b.pos());

        if let Some(tap) = self.sessions.tap.as_mut() {
            tap.max_pointers = tap.max_pointers.max(event.pointer_count());
            tap.max_movement = tap.max_movement.max(centroid.distance(tap.start_centroid));
        }

        if base.distance <= f32::EPSILON {
            self.sessions.pinch = Some(PinchBaseline { distance, centroid, ..base });
            return;
        }

        let zoom_change = (distance / base.distance).clamp(MIN_ZOOM_CHANGE, MAX_ZOOM_CHANGE);
        let pan_change = centroid - base.centroid;
        if (zoom_change - 1.0).abs() < PINCH_ZOOM_NOISE && pan_change.length() < PINCH_PAN_NOISE_PX {
            return;
        }

        self.sessions.pinch = Some(PinchBaseline { distance, centroid, ..base });
        self.apply_view_change(
            TransformGesture {
                zoom_change,
                pan_change,
                centroid,
            },
            base.centroid,
            ctx,
            listener,
        );
    }

    /// Leaves the transform; fires a multi-finger tap shortcut when the
    /// gesture was short and still.
    pub(super) fn end_transform(&mut self, time_ms: u64, listener: &mut dyn InkListener, allow_tap: bool) {
        let tap = self.sessions.tap.take();
        self.sessions.transforming = false;
        self.sessions.pinch = None;
        debug!("transform end");

        let Some(tap) = tap.filter(|_| allow_tap) else {
            return;
        };
        if time_ms.saturating_sub(tap.start_ms) > MULTI_TAP_TIMEOUT_MS || tap.max_movement > MULTI_TAP_SLOP_PX {
            return;
        }
        match self.settings.tap_action(tap.max_pointers) {
            MultiFingerTapAction::Undo => {
                debug!("{}-finger tap: undo", tap.max_pointers);
                listener.on_undo_shortcut();
            }
            MultiFingerTapAction::Redo => {
                debug!("{}-finger tap: redo", tap.max_pointers);
                listener.on_redo_shortcut();
            }
            MultiFingerTapAction::None => {}
        }
    }

    pub(super) fn handle_pan(
        &mut self,
        event: &PointerEvent,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) -> bool {
        match event.action {
            PointerAction::Down => {
                if self.sessions.pan.is_none() {
                    self.begin_pan(event);
                }
                true
            }
            PointerAction::Move => {
                self.update_pan(event, ctx, listener);
                true
            }
            PointerAction::Up => {
                let lifted = event.action_pointer().map(|p| p.id);
                let owner = self.sessions.pan.map(|p| p.pointer);
                if event.pointer_count() <= 1 || lifted == owner {
                    self.end_pan(event, listener, true);
                }
                true
            }
            PointerAction::Cancel => {
                self.cancel_all(listener);
                true
            }
            PointerAction::HoverEnter | PointerAction::HoverMove | PointerAction::HoverExit => true,
        }
    }

    fn begin_pan(&mut self, event: &PointerEvent) {
        let Some(sample) = event.action_pointer() else {
            return;
        };
        self.cancel_all_strokes();
        self.set_hover(None);
        let pos = sample.pos();
        self.sessions.pan = Some(PanSession {
            pointer: sample.id,
            start: pos,
            last: pos,
            max_travel: 0.0,
        });
        debug!("pan begin (pointer {})", sample.id);
    }

    fn update_pan(&mut self, event: &PointerEvent, ctx: &mut RouterCtx<'_>, listener: &mut dyn InkListener) {
        let Some(mut pan) = self.sessions.pan else {
            return;
        };
        let Some(sample) = event.pointer(pan.pointer) else {
            return;
        };
        let pos = sample.pos();
        let delta = pos - pan.last;
        pan.last = pos;
        pan.max_travel = pan.max_travel.max(pos.distance(pan.start));
        self.sessions.pan = Some(pan);

        if delta == Vec2::zero() {
            return;
        }
        self.apply_view_change(
            TransformGesture {
                zoom_change: 1.0,
                pan_change: delta,
                centroid: pos,
            },
            pos,
            ctx,
            listener,
        );
    }

    /// Leaves the pan; a short, still pan counts as a tap toward a double tap.
    pub(super) fn end_pan(&mut self, event: &PointerEvent, listener: &mut dyn InkListener, allow_tap: bool) {
        let Some(pan) = self.sessions.pan.take() else {
            return;
        };
        debug!("pan end (pointer {})", pan.pointer);
        if !allow_tap {
            return;
        }

        let pos = event.pointer(pan.pointer).map_or(pan.last, |p| p.pos());
        let travel = pan.max_travel.max(pos.distance(pan.start));
        if travel > DOUBLE_TAP_SLOP_PX {
            self.sessions.last_tap = None;
            return;
        }

        let is_double = self.sessions.last_tap.is_some_and(|prev| {
            event.time_ms.saturating_sub(prev.time_ms) <= DOUBLE_TAP_TIMEOUT_MS
                && prev.pos.distance(pos) <= DOUBLE_TAP_SLOP_PX
        });
        if is_double {
            self.sessions.last_tap = None;
            debug!("double tap");
            listener.on_double_tap();
        } else {
            self.sessions.last_tap = Some(TapRecord {
                time_ms: event.time_ms,
                pos,
            });
        }
    }

    /// Applies a view step about `pivot`, enqueues the new transform, and
    /// tells the listener.
    fn apply_view_change(
        &mut self,
        gesture: TransformGesture,
        pivot: Vec2,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) {
        ctx.transform.apply_gesture(gesture.zoom_change, gesture.pan_change, pivot);
        self.queue.send(RenderCommand::SetViewTransform(*ctx.transform));
        listener.on_transform_gesture(gesture);
    }
}

/// Baseline from the first two pointers, skipping the one at `exclude`.
fn pinch_baseline(event: &PointerEvent, exclude: Option<usize>) -> Option<PinchBaseline> {
    let mut remaining = event
        .pointers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .map(|(_, p)| p);
    let a = remaining.next()?;
    let b = remaining.next()?;
    Some(PinchBaseline {
        a: a.id,
        b: b.id,
        distance: a.pos().distance(b.pos()),
        centroid: a.pos().midpoint(b.pos()),
    })
}
