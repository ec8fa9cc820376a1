use crate::ink::StrokeStyle;

use super::smooth::CenterSample;

/// Pressure assumed for samples from devices that report none.
pub const PRESSURE_FALLBACK: f32 = 0.5;

const PRESSURE_GAMMA: f32 = 0.6;
const TAPER_POINT_COUNT: f32 = 5.0;
const TAPER_MIN_FACTOR: f32 = 0.35;
const SHORT_STROKE_THRESHOLD: usize = 8;
const SHORT_STROKE_REDUCTION: f32 = 0.35;
const MIN_RENDERED_WIDTH_FACTOR: f32 = 0.18;
pub(super) const MIN_WIDTH: f32 = 0.01;

/// `pressure^0.6`: light pressure reads wider than a linear map.
#[inline]
pub fn apply_pressure_gamma(pressure: f32) -> f32 {
    pressure.clamp(0.0, 1.0).powf(PRESSURE_GAMMA)
}

/// Width multiplier in `[TAPER_MIN_FACTOR, 1]` that narrows the first and
/// last few samples of a stroke.
pub fn taper_factor(index: usize, total: usize, strength: f32) -> f32 {
    if total <= 1 {
        return 1.0;
    }
    let strength = strength.clamp(0.0, 1.0);
    if strength <= 0.0 {
        return 1.0;
    }
    if total <= SHORT_STROKE_THRESHOLD {
        return 1.0 - SHORT_STROKE_REDUCTION * strength;
    }

    let len = ((TAPER_POINT_COUNT * strength).round() as usize).max(1).min(total / 2);
    if len == 0 {
        return 1.0;
    }

    let ramp = |d: usize| {
        if d < len {
            TAPER_MIN_FACTOR + (1.0 - TAPER_MIN_FACTOR) * (d as f32 / len as f32)
        } else {
            1.0
        }
    };
    let raw = ramp(index).min(ramp(total - 1 - index));
    1.0 - strength * (1.0 - raw)
}

/// Per-sample rendered widths: pressure maps between
/// `base * min_factor` and `base * max_factor`, then the end taper applies.
/// Widths never fall below 18% of the base width.
pub fn per_sample_widths(samples: &[CenterSample], style: &StrokeStyle) -> Vec<f32> {
    let total = samples.len();
    let floor = (style.base_width * MIN_RENDERED_WIDTH_FACTOR).max(MIN_WIDTH);
    let span = style.max_width_factor - style.min_width_factor;

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let gamma = apply_pressure_gamma(s.pressure.unwrap_or(PRESSURE_FALLBACK));
            let width = style.base_width * (style.min_width_factor + span * gamma);
            (width * taper_factor(i, total, style.end_taper_strength)).max(floor)
        })
        .collect()
}
