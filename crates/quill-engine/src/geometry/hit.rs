use crate::coords::Vec2;
use crate::ink::Stroke;

/// Eraser reach in screen pixels; divide by zoom for page units.
pub const ERASER_RADIUS_PX: f32 = 10.0;

/// Distance from `p` to the segment `a..b`. A zero-length segment is a point.
pub fn point_to_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    let len_sq = d.dot(d);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

/// True when any segment of `stroke` passes within `radius` of `p`.
pub fn stroke_hit_by_point(stroke: &Stroke, p: Vec2, radius: f32) -> bool {
    if !stroke.bounds.expand(radius).contains(p) {
        return false;
    }
    match &stroke.points[..] {
        [] => false,
        [only] => only.pos().distance(p) <= radius,
        points => points
            .windows(2)
            .any(|w| point_to_segment_distance(p, w[0].pos(), w[1].pos()) <= radius),
    }
}
