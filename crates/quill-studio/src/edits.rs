use quill_engine::edit::{InkAction, InkHistory};
use quill_engine::ink::{InkPage, Stroke, StrokeId};
use quill_engine::router::{InkListener, TransformGesture};

/// Router callbacks collected during one `handle` call.
///
/// The router borrows the page immutably while it routes, so edits are
/// buffered here and applied afterwards.
#[derive(Debug, Default)]
pub struct PendingEdits {
    finished: Vec<Stroke>,
    render_finished: Vec<StrokeId>,
    erased: Vec<Stroke>,
    split: Vec<(Stroke, Vec<Stroke>)>,
    undo: usize,
    redo: usize,
    pub transformed: bool,
    pub double_taps: usize,
}

/// What applying a batch of edits changed.
#[derive(Debug, Default)]
pub struct AppliedEdits {
    pub page_changed: bool,
    pub history_jumped: bool,
    /// Bounds and max widths of strokes that were added or removed.
    pub touched: Vec<(quill_engine::coords::Rect, f32)>,
    pub render_finished: Vec<StrokeId>,
}

impl PendingEdits {
    pub fn is_empty(&self) -> bool {
        self.finished.is_empty()
            && self.render_finished.is_empty()
            && self.erased.is_empty()
            && self.split.is_empty()
            && self.undo == 0
            && self.redo == 0
    }

    pub fn request_undo(&mut self) {
        self.undo += 1;
    }

    pub fn request_redo(&mut self) {
        self.redo += 1;
    }

    /// Applies every buffered edit to `page` through `history`.
    pub fn apply(&mut self, page: &mut InkPage, history: &mut InkHistory) -> AppliedEdits {
        let mut out = AppliedEdits::default();

        for stroke in self.finished.drain(..) {
            out.touched.push(touched(&stroke));
            out.page_changed |= history.apply(page, InkAction::AddStroke(stroke));
        }
        for stroke in self.erased.drain(..) {
            out.touched.push(touched(&stroke));
            out.page_changed |= history.apply(page, InkAction::remove(stroke));
        }
        for (original, segments) in self.split.drain(..) {
            out.touched.push(touched(&original));
            out.page_changed |= history.apply(page, InkAction::split(original, segments));
        }
        for _ in 0..std::mem::take(&mut self.undo) {
            if history.undo(page) {
                out.page_changed = true;
                out.history_jumped = true;
            }
        }
        for _ in 0..std::mem::take(&mut self.redo) {
            if history.redo(page) {
                out.page_changed = true;
                out.history_jumped = true;
            }
        }

        out.render_finished = std::mem::take(&mut self.render_finished);
        out
    }
}

fn touched(stroke: &Stroke) -> (quill_engine::coords::Rect, f32) {
    (stroke.bounds, stroke.style.max_rendered_width())
}

impl InkListener for PendingEdits {
    fn on_stroke_finished(&mut self, stroke: Stroke) {
        log::debug!("stroke {} finished ({} points)", stroke.id, stroke.len());
        self.finished.push(stroke);
    }

    fn on_stroke_render_finished(&mut self, id: StrokeId) {
        self.render_finished.push(id);
    }

    fn on_stroke_erased(&mut self, stroke: Stroke) {
        self.erased.push(stroke);
    }

    fn on_stroke_split(&mut self, original: Stroke, segments: Vec<Stroke>) {
        self.split.push((original, segments));
    }

    fn on_transform_gesture(&mut self, _gesture: TransformGesture) {
        self.transformed = true;
    }

    fn on_stylus_button_eraser_active_changed(&mut self, active: bool) {
        log::info!("stylus eraser {}", if active { "on" } else { "off" });
    }

    fn on_double_tap(&mut self) {
        self.double_taps += 1;
    }

    fn on_undo_shortcut(&mut self) {
        self.request_undo();
    }

    fn on_redo_shortcut(&mut self) {
        self.request_redo();
    }
}
