//! Ink color model.
//!
//! Stroke colors arrive as `#RRGGBB` / `#AARRGGBB` strings and are resolved
//! once into [`Argb`]; renderers consume premultiplied linear [`Color`].

mod argb;
mod color;

pub use argb::{Argb, ColorParseError};
pub use color::Color;
