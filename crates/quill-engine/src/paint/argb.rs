use std::fmt;
use std::str::FromStr;

/// Failure to parse a stroke color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color {0:?} does not start with '#'")]
    MissingHash(String),
    #[error("color {0:?} must have 6 or 8 hex digits")]
    BadLength(String),
    #[error("color {0:?} contains a non-hex digit")]
    BadDigit(String),
}

/// Packed straight-alpha sRGB color, `0xAARRGGBB`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    pub const BLACK: Argb = Argb(0xFF00_0000);

    /// Parses `#RRGGBB` (opaque) or `#AARRGGBB`.
    pub fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }

        let value = match digits.len() {
            6 => u32::from_str_radix(digits, 16).map(|rgb| 0xFF00_0000 | rgb),
            8 => u32::from_str_radix(digits, 16),
            _ => return Err(ColorParseError::BadLength(s.to_string())),
        };

        value
            .map(Argb)
            .map_err(|_| ColorParseError::BadDigit(s.to_string()))
    }

    #[inline]
    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Straight-alpha sRGB bytes with the alpha channel scaled by `alpha_mult`.
    pub fn to_rgba8(self, alpha_mult: f32) -> [u8; 4] {
        let a = (self.alpha() as f32 / 255.0 * alpha_mult).clamp(0.0, 1.0);
        [self.red(), self.green(), self.blue(), (a * 255.0).round() as u8]
    }
}

impl FromStr for Argb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 0xFF {
            write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            write!(f, "#{:08X}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digits_are_opaque() {
        assert_eq!(Argb::parse_hex("#1E88E5").unwrap(), Argb(0xFF1E_88E5));
    }

    #[test]
    fn eight_digits_keep_alpha() {
        let c: Argb = "#801E88E5".parse().unwrap();
        assert_eq!(c.alpha(), 0x80);
        assert_eq!(c.blue(), 0xE5);
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(Argb::parse_hex("1E88E5"), Err(ColorParseError::MissingHash(_))));
        assert!(matches!(Argb::parse_hex("#1E88E"), Err(ColorParseError::BadLength(_))));
        assert!(matches!(Argb::parse_hex("#1E88EZ"), Err(ColorParseError::BadDigit(_))));
        assert!(matches!(Argb::parse_hex("#+E88E5"), Err(ColorParseError::BadDigit(_))));
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(Argb(0xFF00_0000).to_string(), "#000000");
        assert_eq!(Argb(0x5900_0000).to_string(), "#59000000");
    }

    #[test]
    fn alpha_multiplier_scales_byte() {
        assert_eq!(Argb(0xFF10_2030).to_rgba8(0.2), [0x10, 0x20, 0x30, 51]);
    }
}
