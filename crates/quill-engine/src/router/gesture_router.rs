use std::collections::HashSet;

use log::{debug, trace};

use crate::classify::{event_is_finger_only, PointerClassifier};
use crate::coords::{Vec2, ViewTransform};
use crate::ink::{InkPage, StrokeId, StrokePoint, StrokeSequence, StrokeStyle, Tool};
use crate::input::{PointerAction, PointerEvent, PointerSample};
use crate::paint::Argb;
use crate::render::{HoverPreview, OverlayState, RedrawMode, RenderCommand, RenderQueue};

use super::listener::InkListener;
use super::predictor::MotionPredictor;
use super::session::PointerSessionTable;
use super::settings::{DoubleFingerMode, InputSettings, SingleFingerMode, StylusButtonAction};

/// A stylus held down this long (ms) turns on the long-hold eraser.
pub const LONG_HOLD_MS: u64 = 350;

/// Guard for dividing screen lengths by the zoom.
pub(super) const ZOOM_GUARD: f32 = 0.001;

const ERASER_HOVER_COLOR: Argb = Argb(0xFF6B_6B6B);
const ERASER_HOVER_ALPHA: f32 = 0.6;
const BRUSH_HOVER_ALPHA: f32 = 0.35;

/// Coarse summary of what the router is doing right now.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GestureState {
    Idle,
    Transforming,
    SingleFingerPanning,
    Drawing,
    Erasing,
    Hovering,
}

/// Everything a single event needs from the outside world.
pub struct RouterCtx<'a> {
    /// Current brush; snapshotted into each new stroke.
    pub brush: StrokeStyle,
    /// Mutated only by transform and pan gestures.
    pub transform: &'a mut ViewTransform,
    /// Committed strokes, for eraser hit tests.
    pub page: &'a InkPage,
    pub allow_editing: bool,
    pub allow_finger_gestures: bool,
    pub segment_eraser: bool,
}

impl<'a> RouterCtx<'a> {
    pub fn new(brush: StrokeStyle, transform: &'a mut ViewTransform, page: &'a InkPage) -> Self {
        Self {
            brush,
            transform,
            page,
            allow_editing: true,
            allow_finger_gestures: true,
            segment_eraser: false,
        }
    }

    pub fn with_editing(mut self, allow: bool) -> Self {
        self.allow_editing = allow;
        self
    }

    pub fn with_finger_gestures(mut self, allow: bool) -> Self {
        self.allow_finger_gestures = allow;
        self
    }

    pub fn with_segment_eraser(mut self, enabled: bool) -> Self {
        self.segment_eraser = enabled;
        self
    }

    /// Converts a screen sample to a page point clamped onto the page.
    pub(super) fn page_point(&self, pos: Vec2, sample: &PointerSample, pressure: Option<f32>, t: u64) -> StrokePoint {
        let p = self.page.size().clamp(self.transform.screen_to_page(pos));
        let mut point = StrokePoint::at(p.x, p.y, t);
        if let Some(pressure) = pressure {
            point = point.with_pressure(pressure);
        }
        if sample.tilt != 0.0 || sample.orientation != 0.0 {
            point = point.with_tilt(sample.tilt, sample.orientation);
        }
        point
    }

    /// Page points for `sample`'s batched history followed by its current position.
    pub(super) fn sample_points(&self, sample: &PointerSample, time_ms: u64) -> Vec<StrokePoint> {
        let mut points = Vec::with_capacity(sample.history.len() + 1);
        for h in &sample.history {
            let mut hs = sample.clone();
            hs.tilt = h.tilt;
            hs.orientation = h.orientation;
            points.push(self.page_point(Vec2::new(h.x, h.y), &hs, h.pressure, h.time_ms));
        }
        points.push(self.page_point(sample.pos(), sample, sample.pressure, time_ms));
        points
    }
}

/// Input state machine: turns pointer events into stroke, erase and view
/// intents.
///
/// Routing priority per event: an ongoing or starting multi-finger
/// transform, then an ongoing or starting one-finger pan, then drawing,
/// erasing, hover or cancel by action.
pub struct GestureRouter {
    pub(super) settings: InputSettings,
    pub(super) classifier: PointerClassifier,
    pub(super) sessions: PointerSessionTable,
    pub(super) predictor: Box<dyn MotionPredictor>,
    pub(super) queue: RenderQueue,
    pub(super) sequence: StrokeSequence,
    selection: HashSet<StrokeId>,
    lasso: Vec<Vec2>,
}

impl GestureRouter {
    pub fn new(settings: InputSettings, predictor: Box<dyn MotionPredictor>, queue: RenderQueue) -> Self {
        Self {
            settings,
            classifier: PointerClassifier::new(),
            sessions: PointerSessionTable::new(),
            predictor,
            queue,
            sequence: StrokeSequence::default(),
            selection: HashSet::new(),
            lasso: Vec::new(),
        }
    }

    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: InputSettings) {
        self.settings = settings;
    }

    pub fn sessions(&self) -> &PointerSessionTable {
        &self.sessions
    }

    /// Creation counter for the next finished stroke.
    pub fn set_next_sequence(&mut self, next: u64) {
        self.sequence = StrokeSequence::starting_at(next);
    }

    pub fn state(&self) -> GestureState {
        let s = &self.sessions;
        if s.transforming {
            GestureState::Transforming
        } else if s.pan.is_some() {
            GestureState::SingleFingerPanning
        } else if s.any_erasing() {
            GestureState::Erasing
        } else if !s.captures.is_empty() {
            GestureState::Drawing
        } else if s.hover.is_some() {
            GestureState::Hovering
        } else {
            GestureState::Idle
        }
    }

    /// Continuous while any gesture or stroke is live.
    pub fn redraw_mode(&self) -> RedrawMode {
        match self.state() {
            GestureState::Idle | GestureState::Hovering if self.sessions.predicted.is_empty() => {
                RedrawMode::OnDemand
            }
            _ => RedrawMode::Continuous,
        }
    }

    /// Replaces the selection decorations and pushes a fresh overlay.
    pub fn set_selection(&mut self, selected: HashSet<StrokeId>, lasso: Vec<Vec2>) {
        self.selection = selected;
        self.lasso = lasso;
        self.push_overlay();
    }

    /// Routes one event. Returns whether the router consumed it.
    pub fn handle(&mut self, event: &PointerEvent, ctx: &mut RouterCtx<'_>, listener: &mut dyn InkListener) -> bool {
        if event.pointers.is_empty() && event.action != PointerAction::Cancel {
            trace!("empty {:?} batch ignored", event.action);
            return false;
        }

        self.sync_button_eraser(event, listener);

        let stylus_stream = self.has_stylus_stream(event);
        if !ctx.allow_finger_gestures && !stylus_stream && event.action != PointerAction::Cancel {
            trace!("finger gestures disabled; {:?} ignored", event.action);
            return false;
        }

        if ctx.allow_finger_gestures {
            // A stylus landing ends any finger navigation in progress.
            if event.action == PointerAction::Down && !event_is_finger_only(event) {
                if self.sessions.transforming {
                    self.end_transform(event.time_ms, listener, false);
                }
                if self.sessions.pan.is_some() {
                    self.end_pan(event, listener, false);
                }
            }

            if self.settings.double_finger_mode == DoubleFingerMode::ZoomPan
                && (self.sessions.transforming || starts_transform(event))
            {
                trace!("{:?} -> transform", event.action);
                return self.handle_transform(event, ctx, listener);
            }
            if self.settings.single_finger_mode == SingleFingerMode::Pan
                && (self.sessions.pan.is_some() || starts_pan(event, stylus_stream))
            {
                trace!("{:?} -> pan", event.action);
                return self.handle_pan(event, ctx, listener);
            }
        }

        match event.action {
            PointerAction::Down => self.pointer_down(event, ctx, listener),
            PointerAction::Move => self.pointer_move(event, ctx, listener),
            PointerAction::Up => self.pointer_up(event, ctx, listener),
            PointerAction::HoverEnter | PointerAction::HoverMove => self.hover(event, ctx),
            PointerAction::HoverExit => {
                self.set_hover(None);
                true
            }
            PointerAction::Cancel => {
                self.cancel_all(listener);
                true
            }
        }
    }

    /// Drops every live gesture, as if the platform had cancelled it.
    pub fn reset(&mut self, listener: &mut dyn InkListener) {
        self.cancel_all(listener);
    }

    pub(super) fn has_stylus_stream(&self, event: &PointerEvent) -> bool {
        self.classifier.has_stylus_stream(event)
            || event.pointers.iter().any(|p| self.sessions.captures.contains_key(&p.id))
    }

    fn stylus_button_held(&self, event: &PointerEvent) -> bool {
        (self.settings.stylus_primary_action == StylusButtonAction::EraserHold && event.buttons.primary)
            || (self.settings.stylus_secondary_action == StylusButtonAction::EraserHold && event.buttons.secondary)
    }

    /// Recomputes the button/long-hold eraser flag and reports changes.
    fn sync_button_eraser(&mut self, event: &PointerEvent, listener: &mut dyn InkListener) {
        let long_hold = self.settings.stylus_long_hold_action == StylusButtonAction::EraserHold;
        let s = &mut self.sessions;
        match event.action {
            PointerAction::Down => {
                if let Some(p) = event.action_pointer() {
                    if self.classifier.peek(event, p).is_stylus() {
                        s.long_hold_start.insert(p.id, event.time_ms);
                        s.long_hold_active.remove(&p.id);
                    }
                }
            }
            PointerAction::Move | PointerAction::HoverEnter | PointerAction::HoverMove => {
                if long_hold {
                    for p in &event.pointers {
                        if !self.classifier.peek(event, p).is_stylus() {
                            continue;
                        }
                        let start = s.long_hold_start.get(&p.id).copied().unwrap_or(event.time_ms);
                        if event.time_ms.saturating_sub(start) >= LONG_HOLD_MS {
                            s.long_hold_active.insert(p.id);
                        }
                    }
                } else {
                    s.long_hold_active.clear();
                }
            }
            PointerAction::Up => {
                if let Some(p) = event.action_pointer() {
                    s.long_hold_start.remove(&p.id);
                    s.long_hold_active.remove(&p.id);
                }
            }
            PointerAction::Cancel | PointerAction::HoverExit => {
                s.long_hold_start.clear();
                s.long_hold_active.clear();
            }
        }

        let button = !matches!(event.action, PointerAction::Cancel | PointerAction::HoverExit)
            && self.stylus_button_held(event);
        let active = button || !self.sessions.long_hold_active.is_empty();
        self.set_button_eraser(active, listener);
    }

    pub(super) fn set_button_eraser(&mut self, active: bool, listener: &mut dyn InkListener) {
        if self.sessions.button_eraser_active != active {
            self.sessions.button_eraser_active = active;
            debug!("button eraser {}", if active { "on" } else { "off" });
            listener.on_stylus_button_eraser_active_changed(active);
        }
    }

    /// Stylus hover: show a brush-sized preview while in range.
    fn hover(&mut self, event: &PointerEvent, ctx: &RouterCtx<'_>) -> bool {
        let Some(sample) = event.action_pointer().or_else(|| event.pointers.first()) else {
            return false;
        };
        if !self.classifier.peek(event, sample).is_stylus() {
            self.set_hover(None);
            return false;
        }
        if sample.distance <= 0.0 {
            self.set_hover(None);
            return true;
        }

        let eraser_tip = self.classifier.peek(event, sample).eraser_tip;
        let erasing = self.sessions.button_eraser_active || eraser_tip || ctx.brush.tool == Tool::Eraser;
        let (color, alpha) = if erasing {
            (ERASER_HOVER_COLOR, ERASER_HOVER_ALPHA)
        } else {
            (ctx.brush.color, BRUSH_HOVER_ALPHA)
        };
        let radius = (ctx.brush.base_width * ctx.transform.zoom).max(0.1) / 2.0;
        self.set_hover(Some(HoverPreview {
            center: sample.pos(),
            radius,
            color,
            alpha,
        }));
        true
    }

    pub(super) fn set_hover(&mut self, hover: Option<HoverPreview>) {
        if self.sessions.hover != hover {
            self.sessions.hover = hover;
            self.push_overlay();
        }
    }

    fn push_overlay(&self) {
        self.queue.send(RenderCommand::SetOverlay(OverlayState {
            selected: self.selection.clone(),
            lasso: self.lasso.clone(),
            hover: self.sessions.hover,
        }));
    }

    /// The single place that discards every live stroke and gesture.
    pub(super) fn cancel_all(&mut self, listener: &mut dyn InkListener) {
        self.cancel_all_strokes();
        self.predictor.reset();
        self.classifier.clear();
        let s = &mut self.sessions;
        s.long_hold_start.clear();
        s.long_hold_active.clear();
        s.transforming = false;
        s.pinch = None;
        s.tap = None;
        s.pan = None;
        s.last_tap = None;
        self.set_hover(None);
        self.set_button_eraser(false, listener);
    }

    /// Cancels every in-progress and predicted stroke and clears the
    /// per-pointer maps that refer to them.
    pub(super) fn cancel_all_strokes(&mut self) {
        let s = &mut self.sessions;
        for (pointer, capture) in s.captures.drain() {
            debug!("stroke {} cancelled (pointer {pointer})", capture.stroke_id);
            self.queue.send(RenderCommand::CancelStroke { id: capture.stroke_id });
        }
        for (_, id) in s.predicted.drain() {
            self.queue.send(RenderCommand::CancelStroke { id });
        }
        s.modes.clear();
        s.eraser_trail.clear();
    }
}

/// A second finger joined (or fingers landed together).
fn starts_transform(event: &PointerEvent) -> bool {
    event.action == PointerAction::Down && event.pointer_count() >= 2 && event_is_finger_only(event)
}

/// A lone finger landed with no stylus in play.
fn starts_pan(event: &PointerEvent, stylus_stream: bool) -> bool {
    event.action == PointerAction::Down
        && event.pointer_count() == 1
        && event_is_finger_only(event)
        && !stylus_stream
}
