use crate::coords::Vec2;

use super::smooth::CenterSample;
use super::width::MIN_WIDTH;

/// Left/right offset curves of a variable-width centerline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeOutline {
    pub left: Vec<Vec2>,
    pub right: Vec<Vec2>,
}

impl StrokeOutline {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Offsets every sample by half its width along the local normal.
///
/// Normals use central differences inside the stroke and one-sided
/// differences at the ends; a degenerate tangent falls back to `(0, -1)`.
/// A single sample yields a collapsed outline (both sides on the sample).
/// Returns `None` when there are no samples or fewer widths than samples.
pub fn stroke_outline(samples: &[CenterSample], widths: &[f32]) -> Option<StrokeOutline> {
    if samples.is_empty() || widths.len() < samples.len() {
        return None;
    }

    if samples.len() == 1 {
        let p = samples[0].pos;
        return Some(StrokeOutline {
            left: vec![p],
            right: vec![p],
        });
    }

    let mut left = Vec::with_capacity(samples.len());
    let mut right = Vec::with_capacity(samples.len());
    for (i, s) in samples.iter().enumerate() {
        let half = (widths[i] / 2.0).max(MIN_WIDTH);
        let n = normal_at(samples, i);
        left.push(s.pos + n * half);
        right.push(s.pos - n * half);
    }
    Some(StrokeOutline { left, right })
}

fn normal_at(samples: &[CenterSample], i: usize) -> Vec2 {
    let last = samples.len() - 1;
    let d = if i == 0 {
        samples[1].pos - samples[0].pos
    } else if i == last {
        samples[i].pos - samples[i - 1].pos
    } else {
        samples[i + 1].pos - samples[i - 1].pos
    };
    let len = d.length();
    if len < MIN_WIDTH {
        Vec2::new(0.0, -1.0)
    } else {
        Vec2::new(-d.y / len, d.x / len)
    }
}

/// Two triangles per outline span: `(l0, r0, l1)` and `(r0, r1, l1)`.
pub fn triangulate_outline(outline: &StrokeOutline, out: &mut Vec<Vec2>) {
    let n = outline.len();
    if n < 2 {
        return;
    }
    out.reserve((n - 1) * 6);
    for i in 0..n - 1 {
        let (l0, r0) = (outline.left[i], outline.right[i]);
        let (l1, r1) = (outline.left[i + 1], outline.right[i + 1]);
        out.extend_from_slice(&[l0, r0, l1, r0, r1, l1]);
    }
}

/// Axis-aligned quad (two triangles) centered on `center`.
pub(super) fn dot_quad(center: Vec2, radius: f32, out: &mut Vec<Vec2>) {
    let (x, y, r) = (center.x, center.y, radius);
    out.extend_from_slice(&[
        Vec2::new(x - r, y - r),
        Vec2::new(x + r, y - r),
        Vec2::new(x - r, y + r),
        Vec2::new(x + r, y - r),
        Vec2::new(x + r, y + r),
        Vec2::new(x - r, y + r),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: f32, y: f32) -> CenterSample {
        CenterSample { pos: Vec2::new(x, y), pressure: None }
    }

    #[test]
    fn horizontal_line_offsets_vertically() {
        let o = stroke_outline(&[s(0.0, 0.0), s(10.0, 0.0)], &[4.0, 4.0]).unwrap();
        assert_eq!(o.left[0], Vec2::new(0.0, 2.0));
        assert_eq!(o.right[0], Vec2::new(0.0, -2.0));
        assert_eq!(o.left[1], Vec2::new(10.0, 2.0));
    }

    #[test]
    fn degenerate_tangent_uses_fallback_normal() {
        let o = stroke_outline(&[s(3.0, 3.0), s(3.0, 3.0)], &[2.0, 2.0]).unwrap();
        assert_eq!(o.left[0], Vec2::new(3.0, 2.0));
        assert_eq!(o.right[0], Vec2::new(3.0, 4.0));
    }

    #[test]
    fn too_few_widths_is_rejected() {
        assert!(stroke_outline(&[s(0.0, 0.0), s(1.0, 0.0)], &[1.0]).is_none());
        assert!(stroke_outline(&[], &[]).is_none());
    }

    #[test]
    fn triangulation_emits_six_vertices_per_span() {
        let samples: Vec<_> = (0..5).map(|i| s(i as f32, 0.0)).collect();
        let o = stroke_outline(&samples, &[1.0; 5]).unwrap();
        let mut v = Vec::new();
        triangulate_outline(&o, &mut v);
        assert_eq!(v.len(), 4 * 6);
        assert_eq!(v[0], o.left[0]);
        assert_eq!(v[4], o.right[1]);
    }
}
