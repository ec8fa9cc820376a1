//! Stroke geometry: smoothing, pressure widths, outlines, triangle meshes,
//! and the hit tests the eraser and lasso run against finished strokes.
//!
//! Everything here is pure CPU math in page units.

mod builder;
mod hit;
mod lasso;
mod outline;
mod smooth;
mod width;

pub use builder::{stroke_fingerprint, StrokeGeometry, StrokeGeometryBuilder, StrokeVertex};
pub use hit::{point_to_segment_distance, stroke_hit_by_point, ERASER_RADIUS_PX};
pub use lasso::{find_strokes_in_lasso, point_in_polygon, selection_bounds, transform_strokes};
pub use outline::{stroke_outline, triangulate_outline, StrokeOutline};
pub use smooth::{catmull_rom_smooth, CenterSample};
pub use width::{apply_pressure_gamma, per_sample_widths, taper_factor, PRESSURE_FALLBACK};
