use crate::coords::Vec2;
use crate::ink::StrokePoint;

use super::width::PRESSURE_FALLBACK;

const MIN_SUBDIVISIONS: u32 = 2;
const MAX_SUBDIVISIONS: u32 = 10;
const CENTRIPETAL_ALPHA: f32 = 0.5;
const MIN_KNOT_DISTANCE: f32 = 0.01;
const KNOT_EPSILON: f32 = 0.0001;

/// A centerline sample after smoothing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CenterSample {
    pub pos: Vec2,
    pub pressure: Option<f32>,
}

impl From<&StrokePoint> for CenterSample {
    fn from(p: &StrokePoint) -> Self {
        Self {
            pos: p.pos(),
            pressure: p.pressure,
        }
    }
}

/// Centripetal Catmull-Rom resampling.
///
/// Two points or fewer, or a smoothing level at or below 0.01, pass through
/// unchanged. Otherwise each span is subdivided `round(2 + 8 * level)` times
/// and the curve passes through every original point. Pressure is
/// interpolated along the same spline and clamped to `[0, 1]`.
pub fn catmull_rom_smooth(points: &[StrokePoint], smoothing_level: f32) -> Vec<CenterSample> {
    let level = smoothing_level.clamp(0.0, 1.0);
    if points.len() <= 2 || level <= 0.01 {
        return points.iter().map(CenterSample::from).collect();
    }

    let subdivisions = (MIN_SUBDIVISIONS as f32
        + (MAX_SUBDIVISIONS - MIN_SUBDIVISIONS) as f32 * level)
        .round()
        .clamp(MIN_SUBDIVISIONS as f32, MAX_SUBDIVISIONS as f32) as u32;

    let last = points.len() - 1;
    let mut out = Vec::with_capacity(points.len() * subdivisions as usize);
    out.push(CenterSample::from(&points[0]));

    for i in 0..last {
        let p0 = &points[i.saturating_sub(1)];
        let p1 = &points[i];
        let p2 = &points[i + 1];
        let p3 = &points[(i + 2).min(last)];

        let t0 = 0.0;
        let t1 = t0 + knot_step(p0.pos(), p1.pos());
        let t2 = t1 + knot_step(p1.pos(), p2.pos());
        let t3 = t2 + knot_step(p2.pos(), p3.pos());
        if t2 <= t1 {
            out.push(CenterSample::from(p2));
            continue;
        }

        let knots = [t0, t1, t2, t3];
        let pressures = [p0, p1, p2, p3].map(|p| p.pressure.unwrap_or(PRESSURE_FALLBACK));
        for step in 1..=subdivisions {
            let t = t1 + (t2 - t1) * (step as f32 / subdivisions as f32);
            let x = centripetal_value([p0.x, p1.x, p2.x, p3.x], t, knots);
            let y = centripetal_value([p0.y, p1.y, p2.y, p3.y], t, knots);
            let p = centripetal_value(pressures, t, knots).clamp(0.0, 1.0);
            out.push(CenterSample {
                pos: Vec2::new(x, y),
                pressure: Some(p),
            });
        }
    }
    out
}

fn knot_step(a: Vec2, b: Vec2) -> f32 {
    a.distance(b).max(MIN_KNOT_DISTANCE).powf(CENTRIPETAL_ALPHA)
}

/// Barry-Goldman pyramid evaluation of one coordinate.
fn centripetal_value(v: [f32; 4], t: f32, knots: [f32; 4]) -> f32 {
    let [t0, t1, t2, t3] = knots;
    let t1 = if t1 <= t0 { t0 + KNOT_EPSILON } else { t1 };
    let t2 = if t2 <= t1 { t1 + KNOT_EPSILON } else { t2 };
    let t3 = if t3 <= t2 { t2 + KNOT_EPSILON } else { t3 };

    let a1 = lerp_param(v[0], v[1], t0, t1, t);
    let a2 = lerp_param(v[1], v[2], t1, t2, t);
    let a3 = lerp_param(v[2], v[3], t2, t3, t);

    let b1 = lerp_param(a1, a2, t0, t2, t);
    let b2 = lerp_param(a2, a3, t1, t3, t);

    lerp_param(b1, b2, t1, t2, t)
}

fn lerp_param(v0: f32, v1: f32, t0: f32, t1: f32, t: f32) -> f32 {
    if t1 <= t0 {
        return v1;
    }
    let ratio = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    v0 + (v1 - v0) * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<StrokePoint> {
        (0..n).map(|i| StrokePoint::at(i as f32 * 10.0, 0.0, i as u64)).collect()
    }

    #[test]
    fn short_input_passes_through() {
        let pts = line(2);
        let out = catmull_rom_smooth(&pts, 0.8);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].pos, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn zero_smoothing_passes_through() {
        let out = catmull_rom_smooth(&line(5), 0.0);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn subdivision_count_follows_level() {
        // round(2 + 8 * 0.35) = 5 per span, 4 spans, plus the first point.
        let out = catmull_rom_smooth(&line(5), 0.35);
        assert_eq!(out.len(), 1 + 4 * 5);
    }

    #[test]
    fn passes_through_control_points() {
        let pts = vec![
            StrokePoint::at(0.0, 0.0, 0),
            StrokePoint::at(10.0, 8.0, 1),
            StrokePoint::at(20.0, -3.0, 2),
            StrokePoint::at(30.0, 5.0, 3),
        ];
        let out = catmull_rom_smooth(&pts, 1.0);
        // 10 subdivisions per span: original points land on every 10th sample.
        for (k, p) in pts.iter().enumerate() {
            let s = out[k * 10].pos;
            assert!((s.x - p.x).abs() < 1e-3 && (s.y - p.y).abs() < 1e-3, "k={k} s={s:?}");
        }
    }

    #[test]
    fn duplicate_points_do_not_produce_nan() {
        let pts = vec![
            StrokePoint::at(5.0, 5.0, 0),
            StrokePoint::at(5.0, 5.0, 1),
            StrokePoint::at(5.0, 5.0, 2),
        ];
        for s in catmull_rom_smooth(&pts, 0.5) {
            assert!(s.pos.is_finite());
        }
    }

    #[test]
    fn pressure_is_interpolated_and_clamped() {
        let pts: Vec<StrokePoint> = (0..4)
            .map(|i| StrokePoint::at(i as f32 * 10.0, 0.0, i).with_pressure(if i % 2 == 0 { 0.0 } else { 1.0 }))
            .collect();
        for s in catmull_rom_smooth(&pts, 0.5) {
            let p = s.pressure.unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
