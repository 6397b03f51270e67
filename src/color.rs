//! RGBA color.
//!
//! 8-bit-per-channel straight-alpha color, the named constants the canvas
//! uses as defaults, formatting for each output encoding, and the
//! fixed-point helpers the pixel blender relies on.

use crate::path::Num;
use core::fmt;

// ============================================================================
// Rgba8 (8-bit per channel)
// ============================================================================

/// RGBA color with u8 components and straight (non-premultiplied) alpha.
///
/// Equality is exact component-wise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
    pub const GREEN: Rgba8 = Rgba8::new(0, 128, 0, 255);
    pub const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);
    pub const GRAY: Rgba8 = Rgba8::new(128, 128, 128, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        self.a as f64 / Self::BASE_MASK as f64
    }

    /// CSS color: `#rrggbb` when opaque, `rgba(r,g,b,a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{})",
                self.r,
                self.g,
                self.b,
                Num(round_to(self.opacity(), 3))
            )
        }
    }

    /// Device RGB components in `0.0..=1.0`, separated by spaces, as used
    /// by the PDF and PostScript color operators.
    pub fn device_rgb(&self) -> DeviceRgb {
        DeviceRgb(*self)
    }

    /// Fixed-point multiply, exact over u8.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let m = 10f64.powi(decimals);
    (v * m).round() / m
}

/// Display adapter produced by [`Rgba8::device_rgb`].
pub struct DeviceRgb(Rgba8);

impl fmt::Display for DeviceRgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        let unit = |v: u8| Num(round_to(v as f64 / 255.0, 4));
        write!(f, "{} {} {}", unit(c.r), unit(c.g), unit(c.b))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert!(Rgba8::TRANSPARENT.is_transparent());
        assert!(Rgba8::BLACK.is_opaque());
        assert_eq!(Rgba8::default(), Rgba8::TRANSPARENT);
        assert_eq!(Rgba8::RED.with_alpha(10), Rgba8::new(255, 0, 0, 10));
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Rgba8::RED.to_css(), "#ff0000");
        assert_eq!(Rgba8::new(0, 16, 255, 255).to_css(), "#0010ff");
        assert_eq!(Rgba8::new(10, 20, 30, 128).to_css(), "rgba(10,20,30,0.502)");
        assert_eq!(Rgba8::new(1, 2, 3, 0).to_css(), "rgba(1,2,3,0)");
    }

    #[test]
    fn test_device_rgb() {
        assert_eq!(Rgba8::RED.device_rgb().to_string(), "1 0 0");
        assert_eq!(Rgba8::new(0, 51, 255, 255).device_rgb().to_string(), "0 0.2 1");
    }

    #[test]
    fn test_multiply() {
        assert_eq!(Rgba8::multiply(255, 255), 255);
        assert_eq!(Rgba8::multiply(0, 255), 0);
        assert_eq!(Rgba8::multiply(255, 128), 128);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Rgba8::lerp(0, 255, 255), 255);
        assert_eq!(Rgba8::lerp(255, 0, 255), 0);
        assert_eq!(Rgba8::lerp(100, 200, 0), 100);
        let mid = Rgba8::lerp(0, 255, 128);
        assert!(mid == 128 || mid == 127);
    }
}
