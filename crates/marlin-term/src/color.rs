// SPDX-License-Identifier: MIT
//
// Terminal color types.
//
// The terminal layer speaks 8-bit sRGB, full stop. Anything that wants
// to think in another color model (marlin-palette thinks in HSB) converts
// to `Rgb` before it reaches a cell. `CellColor` adds the one case `Rgb`
// cannot express: "whatever the terminal's own default is", used for
// cells the application never painted.

use std::fmt;

// ─── Rgb ────────────────────────────────────────────────────────────────────

/// An 8-bit sRGB color, the unit of terminal truecolor output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from 8-bit channel values.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Scale all three channels by `factor` (clamped to 0.0..=1.0).
    ///
    /// Used to derive dim overlays (the caption, the popover scrim) from
    /// the current background without leaving sRGB.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: scale_channel(self.r, f),
            g: scale_channel(self.g, f),
            b: scale_channel(self.b, f),
        }
    }

    /// Perceived luminance in 0..=255, using the Rec. 601 weights.
    ///
    /// Coarse, but all it decides is whether dark or light text reads
    /// better on a given background.
    #[must_use]
    pub fn luma(self) -> u8 {
        let y = 0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b);
        y.round() as u8
    }

    /// Whether text on this background should be dark.
    #[inline]
    #[must_use]
    pub fn is_light(self) -> bool {
        self.luma() >= 128
    }
}

#[inline]
fn scale_channel(v: u8, f: f32) -> u8 {
    (f32::from(v) * f).round().clamp(0.0, 255.0) as u8
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ─── CellColor ──────────────────────────────────────────────────────────────

/// A color as stored in a frame cell.
///
/// `Default` defers to the terminal's configured foreground/background;
/// it is what unpainted cells carry and what `reset` restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// The terminal's own default color for this ground.
    #[default]
    Default,
    /// A concrete 24-bit color.
    Rgb(Rgb),
}

impl From<Rgb> for CellColor {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_stores_channels() {
        let c = Rgb::new(10, 20, 30);
        assert_eq!(c.r, 10);
        assert_eq!(c.g, 20);
        assert_eq!(c.b, 30);
    }

    #[test]
    fn scaled_zero_is_black() {
        assert_eq!(Rgb::new(200, 100, 50).scaled(0.0), Rgb::BLACK);
    }

    #[test]
    fn scaled_one_is_identity() {
        let c = Rgb::new(200, 100, 50);
        assert_eq!(c.scaled(1.0), c);
    }

    #[test]
    fn scaled_half_rounds() {
        assert_eq!(Rgb::new(100, 101, 0).scaled(0.5), Rgb::new(50, 51, 0));
    }

    #[test]
    fn scaled_clamps_factor() {
        let c = Rgb::new(100, 100, 100);
        assert_eq!(c.scaled(2.0), c);
        assert_eq!(c.scaled(-1.0), Rgb::BLACK);
    }

    #[test]
    fn luma_extremes() {
        assert_eq!(Rgb::BLACK.luma(), 0);
        assert_eq!(Rgb::WHITE.luma(), 255);
    }

    #[test]
    fn luma_weights_green_highest() {
        let r = Rgb::new(255, 0, 0).luma();
        let g = Rgb::new(0, 255, 0).luma();
        let b = Rgb::new(0, 0, 255).luma();
        assert!(g > r);
        assert!(r > b);
    }

    #[test]
    fn white_is_light_black_is_not() {
        assert!(Rgb::WHITE.is_light());
        assert!(!Rgb::BLACK.is_light());
    }

    #[test]
    fn debug_formats_as_hex() {
        assert_eq!(format!("{:?}", Rgb::new(255, 0, 16)), "#ff0010");
    }

    #[test]
    fn cell_color_default_is_default() {
        assert_eq!(CellColor::default(), CellColor::Default);
    }

    #[test]
    fn cell_color_from_rgb() {
        let rgb = Rgb::new(1, 2, 3);
        assert_eq!(CellColor::from(rgb), CellColor::Rgb(rgb));
    }
}
