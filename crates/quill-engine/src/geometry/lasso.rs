use std::collections::HashSet;

use crate::coords::{Rect, Vec2};
use crate::ink::{InkPage, Stroke, StrokeId, StrokePoint};

/// Even-odd ray cast. Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, &vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn stroke_in_polygon(stroke: &Stroke, polygon: &[Vec2], polygon_bounds: Rect) -> bool {
    if !stroke.bounds.overlaps_strict(polygon_bounds) {
        return false;
    }
    stroke.points.iter().any(|p| point_in_polygon(p.pos(), polygon))
        || point_in_polygon(stroke.bounds.center(), polygon)
}

/// Ids of strokes the lasso encloses, in page z-order.
pub fn find_strokes_in_lasso(page: &InkPage, polygon: &[Vec2]) -> Vec<StrokeId> {
    let Some(polygon_bounds) = (polygon.len() >= 3)
        .then(|| Rect::from_points(polygon.iter().copied()))
        .flatten()
    else {
        return Vec::new();
    };
    page.query_polygon(polygon)
        .into_iter()
        .filter(|s| stroke_in_polygon(s, polygon, polygon_bounds))
        .map(|s| s.id)
        .collect()
}

/// Union of the bounds of `strokes`, or `None` when empty.
pub fn selection_bounds<'a, I>(strokes: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Stroke>,
{
    strokes.into_iter().map(|s| s.bounds).reduce(Rect::union)
}

/// Scales about `pivot` then translates. The base width follows the mean
/// scale factor and bounds are recomputed from the moved points.
pub fn transform_strokes(
    strokes: &[Stroke],
    selected: &HashSet<StrokeId>,
    scale: Vec2,
    pivot: Vec2,
    translate: Vec2,
) -> Vec<Stroke> {
    strokes
        .iter()
        .filter(|s| selected.contains(&s.id))
        .filter_map(|s| transform_stroke(s, scale, pivot, translate))
        .collect()
}

fn transform_stroke(stroke: &Stroke, scale: Vec2, pivot: Vec2, translate: Vec2) -> Option<Stroke> {
    let points: Vec<StrokePoint> = stroke
        .points
        .iter()
        .map(|p| {
            let rel = p.pos() - pivot;
            StrokePoint {
                x: rel.x * scale.x + pivot.x + translate.x,
                y: rel.y * scale.y + pivot.y + translate.y,
                ..*p
            }
        })
        .collect();
    let mut style = stroke.style;
    style.base_width *= (scale.x + scale.y) / 2.0;
    let padding = style.base_width * style.max_width_factor;
    Stroke::from_points(stroke.id, points, style, padding, stroke.sequence).map(|s| Stroke {
        created_at: stroke.created_at,
        ..s
    })
}
