use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::ink::{StrokePoint, StrokeStyle};

use super::outline::{dot_quad, stroke_outline, triangulate_outline};
use super::smooth::{catmull_rom_smooth, CenterSample};
use super::width::per_sample_widths;

const MIN_DOT_WIDTH: f32 = 0.5;

/// One triangle-list vertex in page units.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct StrokeVertex {
    pub pos: [f32; 2],
}

impl From<Vec2> for StrokeVertex {
    #[inline]
    fn from(v: Vec2) -> Self {
        Self { pos: [v.x, v.y] }
    }
}

/// A triangulated stroke ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeGeometry {
    pub vertices: Vec<StrokeVertex>,
    pub bounds: Rect,
    pub fingerprint: u64,
}

impl StrokeGeometry {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn byte_size(&self) -> u64 {
        (self.vertices.len() * std::mem::size_of::<StrokeVertex>()) as u64
    }
}

/// Hash of everything that affects a stroke's mesh.
pub fn stroke_fingerprint(points: &[StrokePoint], style: &StrokeStyle) -> u64 {
    let mut h = DefaultHasher::new();
    points.len().hash(&mut h);
    for p in points {
        p.x.to_bits().hash(&mut h);
        p.y.to_bits().hash(&mut h);
        p.pressure.map(f32::to_bits).hash(&mut h);
    }
    style.hash(&mut h);
    h.finish()
}

/// Turns raw stroke samples into triangle lists.
///
/// Holds scratch buffers so repeated rebuilds of a growing active stroke
/// do not reallocate.
#[derive(Debug, Default)]
pub struct StrokeGeometryBuilder {
    scratch: Vec<Vec2>,
}

impl StrokeGeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooth, width, outline, triangulate. `None` for an empty point list.
    pub fn build(&mut self, points: &[StrokePoint], style: &StrokeStyle) -> Option<StrokeGeometry> {
        if points.is_empty() {
            return None;
        }

        let samples = catmull_rom_smooth(points, style.smoothing_level);
        let widths = per_sample_widths(&samples, style);

        self.scratch.clear();
        if samples.len() == 1 {
            let radius = widths[0].max(MIN_DOT_WIDTH) / 2.0;
            dot_quad(samples[0].pos, radius, &mut self.scratch);
        } else {
            let outline = stroke_outline(&samples, &widths)?;
            triangulate_outline(&outline, &mut self.scratch);
        }

        Some(self.finish(stroke_fingerprint(points, style)))
    }

    /// Constant-width polyline, used for overlay outlines like the lasso.
    /// A closed path repeats its first point at the end.
    pub fn polyline(&mut self, path: &[Vec2], width: f32) -> Option<StrokeGeometry> {
        if path.len() < 2 {
            return None;
        }
        let samples: Vec<CenterSample> = path
            .iter()
            .map(|&pos| CenterSample { pos, pressure: None })
            .collect();
        let widths = vec![width; samples.len()];
        let outline = stroke_outline(&samples, &widths)?;

        self.scratch.clear();
        triangulate_outline(&outline, &mut self.scratch);

        let mut h = DefaultHasher::new();
        for p in path {
            p.x.to_bits().hash(&mut h);
            p.y.to_bits().hash(&mut h);
        }
        width.to_bits().hash(&mut h);
        Some(self.finish(h.finish()))
    }

    /// Circle outline approximated by `segments` spans.
    pub fn ring(&mut self, center: Vec2, radius: f32, width: f32, segments: u32) -> Option<StrokeGeometry> {
        let segments = segments.max(3);
        let path: Vec<Vec2> = (0..=segments)
            .map(|i| {
                let a = i as f32 / segments as f32 * std::f32::consts::TAU;
                center + Vec2::new(a.cos(), a.sin()) * radius
            })
            .collect();
        self.polyline(&path, width)
    }

    fn finish(&mut self, fingerprint: u64) -> StrokeGeometry {
        let bounds = Rect::from_points(self.scratch.iter().copied()).unwrap_or_default();
        StrokeGeometry {
            vertices: self.scratch.iter().copied().map(StrokeVertex::from).collect(),
            bounds,
            fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::Tool;

    fn line(n: usize) -> Vec<StrokePoint> {
        (0..n)
            .map(|i| StrokePoint::at(i as f32 * 10.0, 50.0, i as u64 * 8).with_pressure(0.5))
            .collect()
    }

    // ── build ───────────────────────────────────────────────────────────

    #[test]
    fn empty_points_build_nothing() {
        let mut b = StrokeGeometryBuilder::new();
        assert!(b.build(&[], &StrokeStyle::default()).is_none());
    }

    #[test]
    fn single_point_is_a_quad() {
        let mut b = StrokeGeometryBuilder::new();
        let style = StrokeStyle::default().with_width(0.2);
        let g = b.build(&[StrokePoint::at(5.0, 5.0, 0)], &style).unwrap();
        assert_eq!(g.vertices.len(), 6);
        // width is clamped up so the dot stays visible
        assert_eq!(g.bounds, Rect::new(4.75, 4.75, 0.5, 0.5));
    }

    #[test]
    fn line_triangulates_every_span() {
        let mut b = StrokeGeometryBuilder::new();
        let style = StrokeStyle { smoothing_level: 0.0, ..StrokeStyle::default() };
        let g = b.build(&line(4), &style).unwrap();
        assert_eq!(g.vertices.len(), 3 * 6);
        assert!(g.bounds.min().x <= 0.0 && g.bounds.max().x >= 30.0);
        assert!(g.bounds.min().y < 50.0 && g.bounds.max().y > 50.0);
    }

    #[test]
    fn smoothing_adds_samples() {
        let mut b = StrokeGeometryBuilder::new();
        let rough = b.build(&line(4), &StrokeStyle { smoothing_level: 0.0, ..StrokeStyle::default() }).unwrap();
        let smooth = b.build(&line(4), &StrokeStyle { smoothing_level: 1.0, ..StrokeStyle::default() }).unwrap();
        assert!(smooth.vertices.len() > rough.vertices.len());
    }

    // ── fingerprint ─────────────────────────────────────────────────────

    #[test]
    fn fingerprint_tracks_points_and_style() {
        let pts = line(5);
        let style = StrokeStyle::default();
        let base = stroke_fingerprint(&pts, &style);
        assert_eq!(base, stroke_fingerprint(&pts, &style));

        let mut moved = pts.clone();
        moved[2].y += 1.0;
        assert_ne!(base, stroke_fingerprint(&moved, &style));
        assert_ne!(base, stroke_fingerprint(&pts, &style.with_tool(Tool::Highlighter)));
    }

    // ── overlays ────────────────────────────────────────────────────────

    #[test]
    fn ring_closes_around_center() {
        let mut b = StrokeGeometryBuilder::new();
        let g = b.ring(Vec2::new(0.0, 0.0), 10.0, 2.0, 28).unwrap();
        assert_eq!(g.vertices.len(), 28 * 6);
        assert!((g.bounds.center().x).abs() < 0.5);
        assert!(g.bounds.width() >= 20.0);
    }

    #[test]
    fn polyline_needs_two_points() {
        let mut b = StrokeGeometryBuilder::new();
        assert!(b.polyline(&[Vec2::new(1.0, 1.0)], 2.0).is_none());
    }
}
