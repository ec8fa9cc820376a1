use super::Argb;

/// Linear premultiplied RGBA color, as consumed by the stroke pipeline.
///
/// Invariant: `r`, `g`, `b` are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Resolves a packed sRGB color with an extra alpha multiplier
    /// (highlighter, predicted tail, selection tint).
    pub fn from_argb(argb: Argb, alpha_mult: f32) -> Self {
        let a = (argb.alpha() as f32 / 255.0 * alpha_mult).clamp(0.0, 1.0);
        Self {
            r: srgb_to_linear(argb.red()) * a,
            g: srgb_to_linear(argb.green()) * a,
            b: srgb_to_linear(argb.blue()) * a,
            a,
        }
    }

    /// Opaque color from straight sRGB bytes.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(
            Argb(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32),
            1.0,
        )
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Clear color for a render pass.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_multiplier_premultiplies() {
        let c = Color::from_argb(Argb(0xFFFF_FFFF), 0.35);
        assert!((c.a - 0.35).abs() < 1e-6);
        assert!((c.r - 0.35).abs() < 1e-6);
    }

    #[test]
    fn alpha_is_clamped() {
        let c = Color::from_argb(Argb(0xFF00_0000), 3.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn black_stays_black() {
        assert_eq!(Color::from_srgb_u8(0, 0, 0), Color::from_premul(0.0, 0.0, 0.0, 1.0));
    }
}
