//! The HSB color model: how the light's color is specified.
//!
//! Hue, saturation, and brightness are stored as the integers the rest
//! of the application traffics in (degrees, percent, percent). The only
//! operation is the one-way mapping to terminal RGB; nothing ever needs
//! to go back.

use marlin_term::color::Rgb;

/// A color in hue/saturation/brightness terms, immutable once computed.
///
/// - `hue`: degrees on the color circle, `0..360`
/// - `saturation`: percent, `0..=100`; 0 is achromatic
/// - `brightness`: percent, `0..=100`; 0 is black
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsb {
    pub hue: u16,
    pub saturation: u8,
    pub brightness: u8,
}

impl Hsb {
    /// Degrees on the hue circle.
    pub const MAX_HUE: u16 = 360;

    /// Saturation is a percentage.
    pub const MAX_SATURATION: u8 = 100;

    /// Brightness is a percentage.
    pub const MAX_BRIGHTNESS: u8 = 100;

    /// The built-in light color: a calm sky blue at comfortable brightness.
    pub const DEFAULT: Self = Self {
        hue: 192,
        saturation: 60,
        brightness: 85,
    };

    /// Create a color from components.
    ///
    /// Components outside their documented ranges are a caller bug;
    /// debug builds catch them, release builds clamp during conversion.
    #[inline]
    #[must_use]
    pub const fn new(hue: u16, saturation: u8, brightness: u8) -> Self {
        debug_assert!(hue < Self::MAX_HUE);
        debug_assert!(saturation <= Self::MAX_SATURATION);
        debug_assert!(brightness <= Self::MAX_BRIGHTNESS);
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Map to 8-bit sRGB via the standard HSV sector algorithm.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let h = f32::from(self.hue % Self::MAX_HUE);
        let s = f32::from(self.saturation.min(Self::MAX_SATURATION)) / 100.0;
        let v = f32::from(self.brightness.min(Self::MAX_BRIGHTNESS)) / 100.0;

        let c = v * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());

        let (r, g, b) = match hp as u8 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let m = v - c;
        Rgb::new(channel(r + m), channel(g + m), channel(b + m))
    }
}

#[inline]
fn channel(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_at_full_brightness() {
        assert_eq!(Hsb::new(0, 0, 100).to_rgb(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn zero_brightness_is_black_regardless_of_hue() {
        for hue in [0, 90, 192, 300] {
            assert_eq!(Hsb::new(hue, 100, 0).to_rgb(), Rgb::new(0, 0, 0));
        }
    }

    #[test]
    fn zero_saturation_is_achromatic() {
        for brightness in [25, 50, 85] {
            let c = Hsb::new(192, 0, brightness).to_rgb();
            assert_eq!(c.r, c.g);
            assert_eq!(c.g, c.b);
        }
    }

    #[test]
    fn primary_anchors() {
        assert_eq!(Hsb::new(0, 100, 100).to_rgb(), Rgb::new(255, 0, 0));
        assert_eq!(Hsb::new(120, 100, 100).to_rgb(), Rgb::new(0, 255, 0));
        assert_eq!(Hsb::new(240, 100, 100).to_rgb(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn secondary_anchors() {
        assert_eq!(Hsb::new(60, 100, 100).to_rgb(), Rgb::new(255, 255, 0));
        assert_eq!(Hsb::new(180, 100, 100).to_rgb(), Rgb::new(0, 255, 255));
        assert_eq!(Hsb::new(300, 100, 100).to_rgb(), Rgb::new(255, 0, 255));
    }

    #[test]
    fn brightness_scales_channels() {
        let full = Hsb::new(0, 100, 100).to_rgb();
        let half = Hsb::new(0, 100, 50).to_rgb();
        assert!(half.r < full.r);
        assert_eq!(half.g, 0);
        assert_eq!(half.b, 0);
    }

    #[test]
    fn default_is_the_documented_triple() {
        assert_eq!(Hsb::DEFAULT, Hsb::new(192, 60, 85));
    }

    #[test]
    fn default_reads_as_a_soft_blue() {
        let c = Hsb::DEFAULT.to_rgb();
        assert!(c.b > c.r, "blue should dominate red: {c:?}");
        assert!(c.g > c.r, "cyan-leaning hue: {c:?}");
    }

    #[test]
    fn conversion_is_deterministic() {
        let a = Hsb::new(192, 60, 85).to_rgb();
        let b = Hsb::new(192, 60, 85).to_rgb();
        assert_eq!(a, b);
    }
}
