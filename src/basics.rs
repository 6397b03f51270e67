//! Foundation types, constants, and vertex command utilities.
//!
//! Everything else in the crate depends on this module: rounding helpers,
//! the fill rule, the 2-D point type, and the `VertexSource` protocol that
//! flattened geometry flows through on its way to the stroker, the dasher
//! and the rasterizer.

use core::ops::{Add, Mul, Neg, Sub};

// ============================================================================
// Rounding
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

/// Subpixel accuracy of the rasterizer (number of fractional bits).
/// With 8 fractional bits and 32-bit integers, coordinate capacity is 24 bits.
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

// ============================================================================
// Fill rule
// ============================================================================

/// Rule deciding which regions of a possibly self-intersecting path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Non-zero winding number.
    #[default]
    NonZero,
    EvenOdd,
}

// ============================================================================
// Angles
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees.
#[inline]
pub fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

// ============================================================================
// Point
// ============================================================================

/// A point (or vector) in document space, Y increasing upward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Component-wise comparison within `eps`.
    #[inline]
    pub fn equals_eps(self, other: PointD, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    /// Linear interpolation towards `other` by `t`.
    #[inline]
    pub fn lerp(self, other: PointD, t: f64) -> PointD {
        PointD::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl Add for PointD {
    type Output = PointD;
    fn add(self, rhs: PointD) -> PointD {
        PointD::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointD {
    type Output = PointD;
    fn sub(self, rhs: PointD) -> PointD {
        PointD::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PointD {
    type Output = PointD;
    fn mul(self, rhs: f64) -> PointD {
        PointD::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for PointD {
    type Output = PointD;
    fn neg(self) -> PointD {
        PointD::new(-self.x, -self.y)
    }
}

// ============================================================================
// Vertex commands
// ============================================================================

pub const PATH_CMD_STOP: u32 = 0;
pub const PATH_CMD_MOVE_TO: u32 = 1;
pub const PATH_CMD_LINE_TO: u32 = 2;
pub const PATH_CMD_END_POLY: u32 = 0x0F;

pub const PATH_FLAGS_CLOSE: u32 = 0x40;

/// Returns `true` if `c` is the stop command.
#[inline]
pub fn is_stop(c: u32) -> bool {
    c == PATH_CMD_STOP
}

/// Returns `true` if `c` is a move_to command.
#[inline]
pub fn is_move_to(c: u32) -> bool {
    c == PATH_CMD_MOVE_TO
}

/// Returns `true` if `c` is a vertex command (move_to or line_to).
#[inline]
pub fn is_vertex(c: u32) -> bool {
    (PATH_CMD_MOVE_TO..PATH_CMD_END_POLY).contains(&c)
}

/// Returns `true` if `c` closes the current polygon.
#[inline]
pub fn is_close(c: u32) -> bool {
    c == (PATH_CMD_END_POLY | PATH_FLAGS_CLOSE)
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// A rewindable stream of flattened vertices.
///
/// Every converter in the crate (curve flattening, stroke outlines, dash
/// splitting) ultimately feeds the rasterizer through this protocol.
pub trait VertexSource {
    /// Reset the source to its first vertex.
    fn rewind(&mut self);

    /// Return the next vertex. Writes coordinates to `x` and `y`, returns a
    /// vertex command. Returns `PATH_CMD_STOP` when iteration is complete.
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

impl<T: VertexSource> VertexSource for &mut T {
    fn rewind(&mut self) {
        (*self).rewind();
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        (*self).vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================
