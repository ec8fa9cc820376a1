//! Ink data model: points, styles, finished strokes and the page that holds them.

mod page;
mod point;
mod stroke;
mod style;

pub use page::InkPage;
pub use point::StrokePoint;
pub use stroke::{Stroke, StrokeId, StrokeSequence};
pub use style::{StrokeStyle, Tool, HIGHLIGHTER_ALPHA, PREDICTED_ALPHA_FACTOR};
