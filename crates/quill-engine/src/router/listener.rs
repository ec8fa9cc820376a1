use crate::coords::Vec2;
use crate::ink::{Stroke, StrokeId};

/// One incremental pinch or pan step, in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformGesture {
    pub zoom_change: f32,
    pub pan_change: Vec2,
    pub centroid: Vec2,
}

/// Outbound callbacks from the gesture router.
///
/// Every method has an empty default so collaborators only implement what
/// they care about. Callbacks run synchronously inside
/// [`GestureRouter::handle`](super::GestureRouter::handle); they must not block.
#[allow(unused_variables)]
pub trait InkListener {
    /// A completed stroke, ready to be persisted.
    fn on_stroke_finished(&mut self, stroke: Stroke) {}

    /// The renderer may drop its held copy of this in-flight stroke once the
    /// committed set contains it.
    fn on_stroke_render_finished(&mut self, id: StrokeId) {}

    /// A stroke the eraser touched; the collaborator removes it.
    fn on_stroke_erased(&mut self, stroke: Stroke) {}

    /// The segment eraser cut `original` into `segments` (possibly none).
    fn on_stroke_split(&mut self, original: Stroke, segments: Vec<Stroke>) {}

    /// Informational: the router has already applied this to the view.
    fn on_transform_gesture(&mut self, gesture: TransformGesture) {}

    fn on_stylus_button_eraser_active_changed(&mut self, active: bool) {}

    fn on_double_tap(&mut self) {}

    fn on_undo_shortcut(&mut self) {}

    fn on_redo_shortcut(&mut self) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullListener;

impl InkListener for NullListener {}
