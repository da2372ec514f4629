use std::str::FromStr;

use thiserror::Error;

/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are expected to be multiplied by `a` (premultiplied alpha).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

/// Failure to parse a `#rrggbb` / `#rrggbbaa` color literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color literal must start with '#', got {0:?}")]
    MissingHash(String),
    #[error("color literal must be #rrggbb or #rrggbbaa, got {0} digits")]
    BadLength(usize),
    #[error("invalid hex digit in color literal {0:?}")]
    BadDigit(String),
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// Creates a premultiplied color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Parses a `#rrggbb` or `#rrggbbaa` literal (straight alpha) into a
    /// premultiplied color.
    pub fn from_hex(src: &str) -> Result<Self, ColorParseError> {
        let src = src.trim();
        let Some(hex) = src.strip_prefix('#') else {
            return Err(ColorParseError::MissingHash(src.to_string()));
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(src.to_string()));
        }
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::BadLength(hex.len()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigit(src.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::from_srgb_u8(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: (r.clamp(0.0, 1.0)) * a,
            g: (g.clamp(0.0, 1.0)) * a,
            b: (b.clamp(0.0, 1.0)) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// Same hue with the straight alpha replaced by `alpha` (clamped to [0, 1]).
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Self {
        let (r, g, b, _) = self.to_straight();
        Self::from_straight(r, g, b, alpha)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_literal_as_opaque() {
        let c = Color::from_hex("#ff0000").unwrap();
        assert_eq!(c, Color::from_premul(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn parses_eight_digit_literal_premultiplied() {
        let c: Color = "#ffffff00".parse().unwrap();
        assert_eq!(c, Color::transparent());
    }

    #[test]
    fn rejects_missing_hash() {
        assert_eq!(
            Color::from_hex("ff0000"),
            Err(ColorParseError::MissingHash("ff0000".into()))
        );
    }

    #[test]
    fn rejects_bad_length_and_digits() {
        assert_eq!(Color::from_hex("#fff"), Err(ColorParseError::BadLength(3)));
        assert!(matches!(Color::from_hex("#gg0000"), Err(ColorParseError::BadDigit(_))));
        // Multi-byte input must not slice through a char boundary.
        assert!(matches!(Color::from_hex("#ééé"), Err(ColorParseError::BadDigit(_))));
    }

    #[test]
    fn with_alpha_keeps_hue() {
        let c = Color::from_straight(0.5, 0.25, 1.0, 1.0).with_alpha(0.5);
        let (r, g, b, a) = c.to_straight();
        assert!((r - 0.5).abs() < 1e-6);
        assert!((g - 0.25).abs() < 1e-6);
        assert!((b - 1.0).abs() < 1e-6);
        assert_eq!(a, 0.5);
    }
}
