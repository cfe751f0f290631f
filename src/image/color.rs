//! Brand color utilities: hex parsing, contrast selection, HSL
//! lighten/darken for derived theme variants.

use anyhow::{Result, bail};

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn parse(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex color `{hex}`");
        }
        Ok(Self {
            r: u8::from_str_radix(&digits[0..2], 16)?,
            g: u8::from_str_radix(&digits[2..4], 16)?,
            b: u8::from_str_radix(&digits[4..6], 16)?,
        })
    }

    /// Format as upper-case `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Relative luminance in `[0, 1]` (ITU-R BT.601 weights).
    pub fn luminance(self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    /// Black or white, whichever contrasts more against `self`.
    pub fn contrast_color(self) -> Rgb {
        if self.luminance() > 0.5 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }

    /// Reduce lightness by `amount` (0..=1) in HSL space.
    pub fn darken(self, amount: f64) -> Rgb {
        let (h, s, l) = self.to_hsl();
        Rgb::from_hsl(h, s, (l - amount).clamp(0.0, 1.0))
    }

    /// Increase lightness by `amount` (0..=1) in HSL space.
    pub fn lighten(self, amount: f64) -> Rgb {
        let (h, s, l) = self.to_hsl();
        Rgb::from_hsl(h, s, (l + amount).clamp(0.0, 1.0))
    }

    /// Convert to HSL: hue in degrees, saturation/lightness in `[0, 1]`.
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        (h, s, l)
    }

    /// Convert from HSL (hue in degrees, saturation/lightness in `[0, 1]`).
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Rgb {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h_prime = h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());

        let (r1, g1, b1) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let m = l - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: channel(r1),
            g: channel(g1),
            b: channel(b1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let color = Rgb::parse("#2196F3").unwrap();
        assert_eq!(color, Rgb { r: 0x21, g: 0x96, b: 0xF3 });
        assert_eq!(color.to_hex(), "#2196F3");

        assert_eq!(Rgb::parse("1976D2").unwrap().to_hex(), "#1976D2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::parse("#21F").is_err());
        assert!(Rgb::parse("#2196FZ").is_err());
        assert!(Rgb::parse("").is_err());
    }

    #[test]
    fn test_contrast_color() {
        // #2196F3 luminance is below the midpoint
        assert_eq!(Rgb::parse("#2196F3").unwrap().contrast_color(), Rgb::WHITE);
        assert_eq!(Rgb::parse("#FFEB3B").unwrap().contrast_color(), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.contrast_color(), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.contrast_color(), Rgb::BLACK);
    }

    #[test]
    fn test_luminance_bounds() {
        assert_eq!(Rgb::BLACK.luminance(), 0.0);
        assert!((Rgb::WHITE.luminance() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hsl_roundtrip() {
        for hex in ["#2196F3", "#1976D2", "#FF0000", "#00FF00", "#808080"] {
            let color = Rgb::parse(hex).unwrap();
            let (h, s, l) = color.to_hsl();
            let back = Rgb::from_hsl(h, s, l);
            assert!((back.r as i32 - color.r as i32).abs() <= 1, "{hex}");
            assert!((back.g as i32 - color.g as i32).abs() <= 1, "{hex}");
            assert!((back.b as i32 - color.b as i32).abs() <= 1, "{hex}");
        }
    }

    #[test]
    fn test_darken_produces_distinct_variant() {
        let primary = Rgb::parse("#2196F3").unwrap();
        let dark = primary.darken(0.12);
        assert_ne!(dark, primary);
        assert!(dark.luminance() < primary.luminance());
    }

    #[test]
    fn test_lighten_produces_distinct_variant() {
        let primary = Rgb::parse("#1976D2").unwrap();
        let light = primary.lighten(0.12);
        assert_ne!(light, primary);
        assert!(light.luminance() > primary.luminance());
    }

    #[test]
    fn test_darken_clamps_at_black() {
        assert_eq!(Rgb::BLACK.darken(0.5), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.lighten(0.5), Rgb::WHITE);
    }
}
