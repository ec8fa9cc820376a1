//! Contact handling: stroke capture, the predicted tail, and erasing.

use log::{debug, trace};

use crate::coords::Rect;
use crate::edit::compute_split_candidates;
use crate::geometry::{stroke_hit_by_point, ERASER_RADIUS_PX};
use crate::ink::{Stroke, StrokeId, Tool, PREDICTED_ALPHA_FACTOR};
use crate::input::{PointerEvent, PointerId, PointerSample};
use crate::render::RenderCommand;

use super::gesture_router::{GestureRouter, RouterCtx, ZOOM_GUARD};
use super::listener::InkListener;
use super::session::{ActiveCapture, PointerMode};
use super::settings::{DoubleFingerMode, SingleFingerMode};

/// Stylus contacts larger than this are treated as a resting palm.
const PALM_CONTACT_SIZE: f32 = 1.0;

/// Screen-pixel slack around the page for accepting a stroke start.
const PAGE_EDGE_TOLERANCE_PX: f32 = 12.0;

impl GestureRouter {
    pub(super) fn pointer_down(
        &mut self,
        event: &PointerEvent,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) -> bool {
        let Some(sample) = event.action_pointer() else {
            return false;
        };
        let palm = self.classifier.peek(event, sample).is_stylus() && sample.size > PALM_CONTACT_SIZE;
        if event.canceled || palm {
            trace!("down from pointer {} rejected (size {})", sample.id, sample.size);
            self.sessions.long_hold_start.remove(&sample.id);
            return false;
        }
        // A repeated down for a live pointer drops the stroke it left behind.
        self.discard_pointer(sample.id);

        let class = self.classifier.classify(event, sample);
        if !class.is_stylus() {
            if event.pointer_count() > 1 && self.settings.double_finger_mode == DoubleFingerMode::Ignore {
                return false;
            }
            if self.settings.single_finger_mode != SingleFingerMode::Draw {
                return false;
            }
        }
        if !ctx.allow_editing {
            return true;
        }

        let erase = class.eraser_tip
            || ctx.brush.tool == Tool::Eraser
            || (class.is_stylus() && self.sessions.button_eraser_active);
        if erase {
            self.sessions.modes.insert(sample.id, PointerMode::Erase);
            self.set_hover(None);
            self.erase_at(sample, ctx, listener);
            return true;
        }

        let page_pos = ctx.transform.screen_to_page(sample.pos());
        let tolerance = ctx.transform.screen_len_to_page(PAGE_EDGE_TOLERANCE_PX, ZOOM_GUARD);
        if !ctx.page.size().contains_with_tolerance(page_pos, tolerance) {
            debug!("stroke start at ({:.1}, {:.1}) is off the page", page_pos.x, page_pos.y);
            return true;
        }

        self.set_hover(None);
        self.clear_predicted(sample.id);
        self.predictor.record(event);

        let style = ctx.brush;
        let stroke_id = StrokeId::new();
        let points = ctx.sample_points(sample, event.time_ms);
        let mut capture = ActiveCapture {
            stroke_id,
            style,
            points: Vec::with_capacity(points.len().max(32)),
        };
        let mut started = false;
        for point in points {
            if !capture.push(point) {
                continue;
            }
            if started {
                self.queue.send(RenderCommand::AppendToStroke { id: stroke_id, point });
            } else {
                self.queue.send(RenderCommand::StartStroke {
                    id: stroke_id,
                    point,
                    style,
                    alpha: 1.0,
                });
                started = true;
            }
        }
        debug!("stroke {stroke_id} started (pointer {})", sample.id);
        self.sessions.modes.insert(sample.id, PointerMode::Draw);
        self.sessions.captures.insert(sample.id, capture);
        true
    }

    pub(super) fn pointer_move(
        &mut self,
        event: &PointerEvent,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) -> bool {
        if event.canceled {
            for p in &event.pointers {
                self.discard_pointer(p.id);
            }
            self.set_hover(None);
            return true;
        }

        self.predictor.record(event);
        let pointers: Vec<PointerId> = self.sessions.predicted.keys().copied().collect();
        for id in pointers {
            self.clear_predicted(id);
        }

        let mut handled = false;
        for sample in &event.pointers {
            match self.sessions.modes.get(&sample.id).copied() {
                Some(PointerMode::Erase) => {
                    self.erase_at(sample, ctx, listener);
                    handled = true;
                }
                Some(PointerMode::Draw) => {
                    if self.sessions.button_eraser_active
                        && self.classifier.is_sticky(sample.id)
                        && ctx.brush.tool != Tool::Eraser
                    {
                        debug!("pointer {} promoted to eraser", sample.id);
                        self.discard_pointer(sample.id);
                        self.sessions.modes.insert(sample.id, PointerMode::Erase);
                        self.erase_at(sample, ctx, listener);
                        handled = true;
                        continue;
                    }
                    let points = ctx.sample_points(sample, event.time_ms);
                    let Some(capture) = self.sessions.captures.get_mut(&sample.id) else {
                        continue;
                    };
                    for point in points {
                        if capture.push(point) {
                            self.queue.send(RenderCommand::AppendToStroke {
                                id: capture.stroke_id,
                                point,
                            });
                        }
                    }
                    handled = true;
                }
                None => {}
            }
        }

        if !self.sessions.captures.is_empty() {
            self.show_prediction(ctx);
        }
        handled
    }

    pub(super) fn pointer_up(
        &mut self,
        event: &PointerEvent,
        ctx: &mut RouterCtx<'_>,
        listener: &mut dyn InkListener,
    ) -> bool {
        let Some(sample) = event.action_pointer() else {
            return false;
        };
        let id = sample.id;
        let was_stylus = self.classifier.is_sticky(id);
        self.classifier.release(id);
        let mode = self.sessions.modes.remove(&id);
        self.clear_predicted(id);
        self.sessions.eraser_trail.remove(&id);

        if event.canceled {
            self.discard_pointer(id);
            self.set_hover(None);
            return mode.is_some();
        }

        let Some(mut capture) = self.sessions.captures.remove(&id) else {
            if mode.is_some() {
                self.set_hover(None);
            }
            return mode.is_some();
        };

        self.predictor.record(event);
        for point in ctx.sample_points(sample, event.time_ms) {
            if capture.push(point) {
                self.queue.send(RenderCommand::AppendToStroke {
                    id: capture.stroke_id,
                    point,
                });
            }
        }
        self.queue.send(RenderCommand::FinishStroke { id: capture.stroke_id });

        let padding = capture.style.base_width * capture.style.max_width_factor;
        let stroke_id = capture.stroke_id;
        match Stroke::from_points(stroke_id, capture.points, capture.style, padding, self.sequence.next()) {
            Some(stroke) => {
                debug!("stroke {stroke_id} finished ({} points)", stroke.len());
                listener.on_stroke_finished(stroke);
                listener.on_stroke_render_finished(stroke_id);
            }
            None => {
                self.queue.send(RenderCommand::CancelStroke { id: stroke_id });
            }
        }

        self.set_hover(None);
        if was_stylus {
            self.sessions.last_tap = None;
        }
        true
    }

    /// Erase under `sample`, remembering the point so the next call can
    /// sweep the segment between them.
    pub(super) fn erase_at(&mut self, sample: &PointerSample, ctx: &RouterCtx<'_>, listener: &mut dyn InkListener) {
        let current = ctx.transform.screen_to_page(sample.pos());
        let previous = self.sessions.eraser_trail.insert(sample.id, current);
        let radius = ctx.transform.screen_len_to_page(ERASER_RADIUS_PX, ZOOM_GUARD);

        if ctx.segment_eraser {
            let path = match previous {
                Some(prev) => vec![prev, current],
                None => vec![current],
            };
            let Some(area) = Rect::from_points(path.iter().copied()) else {
                return;
            };
            let candidates = compute_split_candidates(ctx.page.query_rect(area.expand(radius)), &path, radius);
            for candidate in candidates {
                trace!("split {} into {} segments", candidate.original.id, candidate.segments.len());
                listener.on_stroke_split(candidate.original, candidate.segments);
            }
        } else {
            let hits: Vec<Stroke> = ctx
                .page
                .query_point(current, radius)
                .into_iter()
                .filter(|s| stroke_hit_by_point(s, current, radius))
                .cloned()
                .collect();
            for stroke in hits {
                trace!("erase {}", stroke.id);
                listener.on_stroke_erased(stroke);
            }
        }
    }

    /// Draws a reduced-alpha tail from each capture's last real point to
    /// where the predictor expects the pointer next.
    fn show_prediction(&mut self, ctx: &RouterCtx<'_>) {
        let Some(predicted) = self.predictor.predict() else {
            return;
        };
        for sample in &predicted.pointers {
            let Some(capture) = self.sessions.captures.get(&sample.id) else {
                continue;
            };
            let Some(anchor) = capture.points.last().copied() else {
                continue;
            };
            let id = StrokeId::new();
            self.queue.send(RenderCommand::StartStroke {
                id,
                point: anchor,
                style: capture.style,
                alpha: PREDICTED_ALPHA_FACTOR,
            });
            let point = ctx.page_point(sample.pos(), sample, sample.pressure, predicted.time_ms);
            self.queue.send(RenderCommand::AppendToStroke { id, point });
            self.sessions.predicted.insert(sample.id, id);
        }
    }

    fn clear_predicted(&mut self, pointer: PointerId) {
        if let Some(id) = self.sessions.predicted.remove(&pointer) {
            self.queue.send(RenderCommand::CancelStroke { id });
        }
    }

    /// Cancels whatever `pointer` was drawing without finalizing it.
    fn discard_pointer(&mut self, pointer: PointerId) {
        if let Some(capture) = self.sessions.captures.get(&pointer) {
            debug!("stroke {} discarded (pointer {pointer})", capture.stroke_id);
            self.queue.send(RenderCommand::CancelStroke { id: capture.stroke_id });
        }
        self.clear_predicted(pointer);
        self.sessions.forget_pointer(pointer);
    }
}
