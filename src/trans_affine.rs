//! Affine transformation matrix.
//!
//! The 2-D matrix behind `Path::translate`, `Path::scale`, `Path::rotate`
//! and `Path::transform`.

/// 2D affine transformation matrix.
///
/// Stores six components `[sx, shy, shx, sy, tx, ty]` representing:
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub fn new() -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    /// Rotation by `a` radians (counter-clockwise, Y up).
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new_custom(ca, sa, -sa, ca, 0.0, 0.0)
    }

    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    // ====================================================================
    // Operations (mutate self)
    // ====================================================================

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Rotate by angle `a` (radians).
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        self.multiply(&Self::new_rotation(a))
    }

    /// Post-multiply: apply `self` first, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    /// Forward transform: `(x, y) -> (x', y')`.
    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx + self.tx;
        *y = tmp * self.shy + *y * self.sy + self.ty;
    }

    /// Forward transform without translation.
    #[inline]
    pub fn transform_2x2(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx;
        *y = tmp * self.shy + *y * self.sy;
    }

    // ====================================================================
    // Auxiliary
    // ====================================================================

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::PI;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_identity() {
        let m = TransAffine::new();
        let (mut x, mut y) = (3.0, 4.0);
        m.transform(&mut x, &mut y);
        assert!((x - 3.0).abs() < EPS && (y - 4.0).abs() < EPS);
    }

    #[test]
    fn test_translation_then_rotation() {
        let mut m = TransAffine::new_translation(1.0, 0.0);
        m.rotate(PI / 2.0);
        let (mut x, mut y) = (0.0, 0.0);
        m.transform(&mut x, &mut y);
        assert!(x.abs() < EPS);
        assert!((y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_linear_part_and_determinant() {
        let mut m = TransAffine::new_scaling(2.0, -1.0);
        m.multiply(&TransAffine::new_translation(5.0, 5.0));
        assert!((m.determinant() + 2.0).abs() < EPS);
        let (mut x, mut y) = (1.0, 1.0);
        m.transform_2x2(&mut x, &mut y);
        assert!((x - 2.0).abs() < EPS && (y + 1.0).abs() < EPS);
        assert!((TransAffine::new_rotation(0.7).determinant() - 1.0).abs() < EPS);
    }
}
