//! Uniform-grid spatial index over page-space bounds.
//!
//! Used by the stroke store for render culling and by the eraser and lasso
//! for hit-test narrowing.

mod grid;

pub use grid::{CellKey, SpatialIndex, DEFAULT_CELL_SIZE};
