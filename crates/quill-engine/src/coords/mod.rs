//! Coordinate and geometry types shared across the engine.
//!
//! Two spaces are in play:
//! - page space: ink units, origin at the page's top-left, +Y down
//! - screen space: logical pixels of the window, origin top-left, +Y down
//!
//! [`ViewTransform`] is the only conversion between them.

mod page;
mod rect;
mod transform;
mod vec2;
mod viewport;

pub use page::PageSize;
pub use rect::Rect;
pub use transform::{ViewTransform, MAX_ZOOM, MIN_ZOOM};
pub use vec2::Vec2;
pub use viewport::Viewport;
