//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `PointerEvent`s through
//! [`WinitPointerInput`].

mod platform;
mod state;
mod types;

pub use platform::WinitPointerInput;
pub use state::{ContactPhase, PointerTracker};
pub use types::{
    HistoricalSample,
    PointerAction,
    PointerEvent,
    PointerId,
    PointerSample,
    SourceHint,
    StylusButtons,
    ToolHint,
};
