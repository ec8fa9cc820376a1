//! Gesture routing: the input state machine between raw pointer events and
//! the ink, view and render collaborators.
//!
//! The router owns all per-pointer state in a [`PointerSessionTable`] and
//! reports outcomes two ways: synchronous [`InkListener`] callbacks for the
//! document side, and [`RenderCommand`](crate::render::RenderCommand)s on a
//! queue for the render side.

mod contact;
mod gesture_router;
mod listener;
mod navigate;
mod predictor;
mod session;
mod settings;

#[cfg(test)]
mod tests;

pub use gesture_router::{GestureRouter, GestureState, RouterCtx, LONG_HOLD_MS};
pub use listener::{InkListener, NullListener, TransformGesture};
pub use navigate::{MAX_ZOOM_CHANGE, MIN_ZOOM_CHANGE};
pub use predictor::{
    resolve_motion_predictor, LinearMotionPredictor, MotionPredictor, NoMotionPredictor, PREDICTION_HORIZON_MS,
};
pub use session::{PointerMode, PointerSessionTable};
pub use settings::{DoubleFingerMode, InputSettings, MultiFingerTapAction, SingleFingerMode, StylusButtonAction};
