//! Stroke math: cap, join, and miter calculations for stroked paths.
//!
//! Computes the outline vertices around one end point or one corner of a
//! flattened center line. `stroke` strings these together into outline
//! contours.

use crate::basics::{PointD, PI};
use crate::curves::clamp_tolerance;
use crate::math::{calc_distance, calc_intersection, cross_product, VertexDist};
use crate::style::{Capper, Joiner};

/// Limit of the inner miter, relative to half the stroke width.
pub const INNER_MITER_LIMIT: f64 = 1.01;

/// Upper bound on the vertices of one round cap or join.
const MAX_ARC_STEPS: f64 = 65536.0;

/// Number of intermediate vertices for an arc spanning `span` radians in
/// steps of at most `da`.
fn arc_steps(span: f64, da: f64) -> i32 {
    let n = span / da;
    if n.is_nan() {
        0
    } else {
        n.min(MAX_ARC_STEPS) as i32
    }
}

// ============================================================================
// MathStroke
// ============================================================================

/// Stroke geometry calculator.
///
/// Computes cap and join vertices for stroked paths. Output vertices are
/// pushed into a `Vec<PointD>` consumer.
pub struct MathStroke {
    width: f64,
    width_abs: f64,
    width_eps: f64,
    width_sign: i32,
    approx_scale: f64,
    capper: Capper,
    joiner: Joiner,
}

impl MathStroke {
    pub fn new() -> Self {
        Self {
            width: 0.5,
            width_abs: 0.5,
            width_eps: 0.5 / 1024.0,
            width_sign: 1,
            approx_scale: 1.0,
            capper: Capper::Butt,
            joiner: Joiner::miter(),
        }
    }

    pub fn set_capper(&mut self, capper: Capper) {
        self.capper = capper;
    }
    pub fn capper(&self) -> Capper {
        self.capper
    }

    pub fn set_joiner(&mut self, joiner: Joiner) {
        self.joiner = joiner;
    }
    pub fn joiner(&self) -> &Joiner {
        &self.joiner
    }

    /// Full stroke width; the outline is offset by half of it on each side.
    pub fn set_width(&mut self, w: f64) {
        self.width = w * 0.5;
        if self.width < 0.0 {
            self.width_abs = -self.width;
            self.width_sign = -1;
        } else {
            self.width_abs = self.width;
            self.width_sign = 1;
        }
        self.width_eps = self.width / 1024.0;
    }

    pub fn width(&self) -> f64 {
        self.width * 2.0
    }

    /// Maximum deviation of round caps and joins from the true arc.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.approx_scale = 0.125 / clamp_tolerance(tolerance);
    }

    /// Calculate cap vertices at a line endpoint.
    ///
    /// `v0` is the endpoint, `v1` is the adjacent vertex, `len` is the
    /// distance between them.
    pub fn calc_cap(&self, vc: &mut Vec<PointD>, v0: &VertexDist, v1: &VertexDist, len: f64) {
        vc.clear();

        let dx1 = (v1.y - v0.y) / len * self.width;
        let dy1 = (v1.x - v0.x) / len * self.width;

        match self.capper {
            Capper::Butt | Capper::Square => {
                let (dx2, dy2) = if self.capper == Capper::Square {
                    (dy1 * self.width_sign as f64, dx1 * self.width_sign as f64)
                } else {
                    (0.0, 0.0)
                };
                vc.push(PointD::new(v0.x - dx1 - dx2, v0.y + dy1 - dy2));
                vc.push(PointD::new(v0.x + dx1 - dx2, v0.y - dy1 - dy2));
            }
            Capper::Round => {
                let da = (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos() * 2.0;
                let n = arc_steps(PI, da);
                let da = PI / (n + 1) as f64;

                vc.push(PointD::new(v0.x - dx1, v0.y + dy1));

                if self.width_sign > 0 {
                    let mut a1 = dy1.atan2(-dx1) + da;
                    for _ in 0..n {
                        vc.push(PointD::new(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 += da;
                    }
                } else {
                    let mut a1 = (-dy1).atan2(dx1) - da;
                    for _ in 0..n {
                        vc.push(PointD::new(
                            v0.x + a1.cos() * self.width,
                            v0.y + a1.sin() * self.width,
                        ));
                        a1 -= da;
                    }
                }

                vc.push(PointD::new(v0.x + dx1, v0.y - dy1));
            }
        }
    }

    /// Calculate join vertices at the junction of two line segments.
    ///
    /// `v0`→`v1` is the first segment, `v1`→`v2` is the second.
    /// `len1` and `len2` are the segment lengths.
    pub fn calc_join(
        &self,
        vc: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        len1: f64,
        len2: f64,
    ) {
        let dx1 = self.width * (v1.y - v0.y) / len1;
        let dy1 = self.width * (v1.x - v0.x) / len1;
        let dx2 = self.width * (v2.y - v1.y) / len2;
        let dy2 = self.width * (v2.x - v1.x) / len2;

        vc.clear();

        let cp = cross_product(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
        if cp != 0.0 && (cp > 0.0) == (self.width > 0.0) {
            // Inner join
            let limit = (len1.min(len2) / self.width_abs).max(INNER_MITER_LIMIT);
            let offsets = Offsets { dx1, dy1, dx2, dy2 };
            if !self.calc_miter(vc, v0, v1, v2, &offsets, limit) {
                offsets.bevel(vc, v1);
            }
            return;
        }

        // Outer join
        let dx = (dx1 + dx2) / 2.0;
        let dy = (dy1 + dy2) / 2.0;
        let dbevel = (dx * dx + dy * dy).sqrt();

        if matches!(self.joiner, Joiner::Round | Joiner::Bevel)
            && self.approx_scale * (self.width_abs - dbevel) < self.width_eps
        {
            // Nearly straight: a single vertex at the intersection.
            if let Some((ix, iy)) = calc_intersection(
                v0.x + dx1,
                v0.y - dy1,
                v1.x + dx1,
                v1.y - dy1,
                v1.x + dx2,
                v1.y - dy2,
                v2.x + dx2,
                v2.y - dy2,
            ) {
                vc.push(PointD::new(ix, iy));
            } else {
                vc.push(PointD::new(v1.x + dx1, v1.y - dy1));
            }
            return;
        }

        let offsets = Offsets { dx1, dy1, dx2, dy2 };
        self.calc_outer_join(vc, &self.joiner, v0, v1, v2, &offsets);
    }

    fn calc_outer_join(
        &self,
        vc: &mut Vec<PointD>,
        joiner: &Joiner,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        o: &Offsets,
    ) {
        match joiner {
            Joiner::Bevel => o.bevel(vc, v1),
            Joiner::Round => self.calc_arc(vc, v1.x, v1.y, o.dx1, -o.dy1, o.dx2, -o.dy2),
            Joiner::Miter { limit, fallback } => {
                if !self.calc_miter(vc, v0, v1, v2, o, miter_limit(*limit)) {
                    self.calc_outer_join(vc, fallback, v0, v1, v2, o);
                }
            }
            // Flattened corners have zero curvature on both sides, so the
            // matching arcs degenerate to the miter lines.
            Joiner::Arcs { limit } => {
                if !self.calc_miter(vc, v0, v1, v2, o, miter_limit(*limit)) {
                    o.bevel(vc, v1);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_arc(
        &self,
        vc: &mut Vec<PointD>,
        x: f64,
        y: f64,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
    ) {
        let mut a1 = (dy1 * self.width_sign as f64).atan2(dx1 * self.width_sign as f64);
        let mut a2 = (dy2 * self.width_sign as f64).atan2(dx2 * self.width_sign as f64);

        let da = (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos() * 2.0;

        vc.push(PointD::new(x + dx1, y + dy1));

        if self.width_sign > 0 {
            if a1 > a2 {
                a2 += 2.0 * PI;
            }
            let n = arc_steps(a2 - a1, da);
            let da = (a2 - a1) / (n + 1) as f64;
            a1 += da;
            for _ in 0..n {
                vc.push(PointD::new(x + a1.cos() * self.width, y + a1.sin() * self.width));
                a1 += da;
            }
        } else {
            if a1 < a2 {
                a2 -= 2.0 * PI;
            }
            let n = arc_steps(a1 - a2, da);
            let da = (a1 - a2) / (n + 1) as f64;
            a1 -= da;
            for _ in 0..n {
                vc.push(PointD::new(x + a1.cos() * self.width, y + a1.sin() * self.width));
                a1 -= da;
            }
        }

        vc.push(PointD::new(x + dx2, y + dy2));
    }

    /// Push the miter vertex if its distance from `v1` stays within
    /// `mlimit` half-widths. Returns `false`, pushing nothing, otherwise.
    fn calc_miter(
        &self,
        vc: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        o: &Offsets,
        mlimit: f64,
    ) -> bool {
        let lim = self.width_abs * mlimit;

        if let Some((xi, yi)) = calc_intersection(
            v0.x + o.dx1,
            v0.y - o.dy1,
            v1.x + o.dx1,
            v1.y - o.dy1,
            v1.x + o.dx2,
            v1.y - o.dy2,
            v2.x + o.dx2,
            v2.y - o.dy2,
        ) {
            if calc_distance(v1.x, v1.y, xi, yi) <= lim {
                vc.push(PointD::new(xi, yi));
                return true;
            }
            return false;
        }

        // Parallel offset lines: either a straight continuation or a full
        // reversal. Only the former has a finite miter.
        let x2 = v1.x + o.dx1;
        let y2 = v1.y - o.dy1;
        if (cross_product(v0.x, v0.y, v1.x, v1.y, x2, y2) < 0.0)
            == (cross_product(v1.x, v1.y, v2.x, v2.y, x2, y2) < 0.0)
        {
            vc.push(PointD::new(x2, y2));
            return true;
        }
        false
    }
}

impl Default for MathStroke {
    fn default() -> Self {
        Self::new()
    }
}

/// NaN stands for an unbounded limit.
fn miter_limit(limit: f64) -> f64 {
    if limit.is_nan() {
        f64::INFINITY
    } else {
        limit
    }
}

/// Perpendicular offsets of the two segments meeting at a corner.
struct Offsets {
    dx1: f64,
    dy1: f64,
    dx2: f64,
    dy2: f64,
}

impl Offsets {
    fn bevel(&self, vc: &mut Vec<PointD>, v1: &VertexDist) {
        vc.push(PointD::new(v1.x + self.dx1, v1.y - self.dy1));
        vc.push(PointD::new(v1.x + self.dx2, v1.y - self.dy2));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vd(x: f64, y: f64, dist: f64) -> VertexDist {
        VertexDist { x, y, dist }
    }

    /// A right-angle turn: east along y=0, then north. The outer side of
    /// the corner is to the right of the travel direction.
    fn right_angle(ms: &MathStroke) -> Vec<PointD> {
        let mut vc = Vec::new();
        let v0 = vd(0.0, 0.0, 10.0);
        let v1 = vd(10.0, 0.0, 10.0);
        let v2 = vd(10.0, 10.0, 0.0);
        ms.calc_join(&mut vc, &v0, &v1, &v2, 10.0, 10.0);
        vc
    }

    /// A very sharp turn (about 11 degrees) so the miter spike is long.
    fn sharp_turn(ms: &MathStroke) -> Vec<PointD> {
        let mut vc = Vec::new();
        let v0 = vd(0.0, 0.0, 10.0);
        let v1 = vd(10.0, 0.0, 0.0);
        let v2 = vd(0.0, 2.0, 0.0);
        let len2 = calc_distance(v1.x, v1.y, v2.x, v2.y);
        ms.calc_join(&mut vc, &v0, &v1, &v2, 10.0, len2);
        vc
    }

    #[test]
    fn test_defaults() {
        let ms = MathStroke::new();
        assert!((ms.width() - 1.0).abs() < 1e-10);
        assert_eq!(ms.capper(), Capper::Butt);
        assert!(matches!(ms.joiner(), Joiner::Miter { .. }));
        assert!((ms.approx_scale - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_width_setter() {
        let mut ms = MathStroke::new();
        ms.set_width(2.0);
        assert!((ms.width() - 2.0).abs() < 1e-10);
        ms.set_width(-2.0);
        assert!((ms.width() + 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_tolerance_sets_scale() {
        let mut ms = MathStroke::new();
        ms.set_tolerance(0.125);
        assert!((ms.approx_scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_tolerance_is_clamped() {
        let mut ms = MathStroke::new();
        ms.set_tolerance(0.0);
        assert!(ms.approx_scale.is_finite());
        ms.set_capper(Capper::Round);
        let mut vc = Vec::new();
        ms.calc_cap(&mut vc, &vd(0.0, 0.0, 10.0), &vd(10.0, 0.0, 0.0), 10.0);
        assert!(vc.len() > 2 && vc.len() < MAX_ARC_STEPS as usize);
    }

    #[test]
    fn test_huge_width_round_cap_is_bounded() {
        let mut ms = MathStroke::new();
        ms.set_width(1e300);
        ms.set_capper(Capper::Round);
        let mut vc = Vec::new();
        ms.calc_cap(&mut vc, &vd(0.0, 0.0, 10.0), &vd(10.0, 0.0, 0.0), 10.0);
        assert!(vc.len() <= MAX_ARC_STEPS as usize + 2);
    }

    #[test]
    fn test_butt_cap() {
        let ms = MathStroke::new();
        let mut vc = Vec::new();
        ms.calc_cap(&mut vc, &vd(0.0, 0.0, 10.0), &vd(10.0, 0.0, 0.0), 10.0);
        assert_eq!(vc.len(), 2);
        assert!((vc[0].y - 0.5).abs() < 1e-6);
        assert!((vc[1].y + 0.5).abs() < 1e-6);
        assert!(vc.iter().all(|p| p.x.abs() < 1e-12));
    }

    #[test]
    fn test_square_cap() {
        let mut ms = MathStroke::new();
        ms.set_capper(Capper::Square);
        let mut vc = Vec::new();
        ms.calc_cap(&mut vc, &vd(0.0, 0.0, 10.0), &vd(10.0, 0.0, 0.0), 10.0);
        assert_eq!(vc.len(), 2);
        assert!(vc.iter().all(|p| (p.x + 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_round_cap() {
        let mut ms = MathStroke::new();
        ms.set_capper(Capper::Round);
        ms.set_width(10.0);
        let mut vc = Vec::new();
        ms.calc_cap(&mut vc, &vd(0.0, 0.0, 10.0), &vd(10.0, 0.0, 0.0), 10.0);
        assert!(vc.len() > 2);
        for p in &vc {
            let d = (p.x * p.x + p.y * p.y).sqrt();
            assert!((d - 5.0).abs() < 1e-9);
            assert!(p.x <= 1e-9);
        }
    }

    #[test]
    fn test_unbounded_miter_join() {
        let ms = MathStroke::new();
        let vc = right_angle(&ms);
        assert_eq!(vc.len(), 1);
        assert!((vc[0].x - 10.5).abs() < 1e-9);
        assert!((vc[0].y + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_bevel_join() {
        let mut ms = MathStroke::new();
        ms.set_joiner(Joiner::Bevel);
        let vc = right_angle(&ms);
        assert_eq!(vc.len(), 2);
        assert!((vc[0].x - 10.0).abs() < 1e-9 && (vc[0].y + 0.5).abs() < 1e-9);
        assert!((vc[1].x - 10.5).abs() < 1e-9 && vc[1].y.abs() < 1e-9);
    }

    #[test]
    fn test_round_join() {
        let mut ms = MathStroke::new();
        ms.set_width(20.0);
        ms.set_joiner(Joiner::Round);
        let vc = right_angle(&ms);
        assert!(vc.len() > 2);
        for p in &vc {
            let d = calc_distance(10.0, 0.0, p.x, p.y);
            assert!((d - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_miter_within_limit() {
        let mut ms = MathStroke::new();
        ms.set_joiner(Joiner::miter_clip(2.0));
        // Right angle spike is sqrt(2) half-widths.
        assert_eq!(right_angle(&ms).len(), 1);
    }

    #[test]
    fn test_miter_limit_falls_back() {
        let mut ms = MathStroke::new();
        ms.set_joiner(Joiner::miter_clip(2.0));
        assert_eq!(sharp_turn(&ms).len(), 2);

        ms.set_joiner(Joiner::miter_with_fallback(2.0, Joiner::Round));
        ms.set_width(20.0);
        assert!(sharp_turn(&ms).len() > 2);

        ms.set_joiner(Joiner::miter());
        assert_eq!(sharp_turn(&ms).len(), 1);
    }

    #[test]
    fn test_arcs_join_clips_to_bevel() {
        let mut ms = MathStroke::new();
        ms.set_joiner(Joiner::arcs(2.0));
        assert_eq!(right_angle(&ms).len(), 1);
        assert_eq!(sharp_turn(&ms).len(), 2);
    }

    #[test]
    fn test_collinear_segments() {
        let ms = MathStroke::new();
        let mut vc = Vec::new();
        let v0 = vd(0.0, 0.0, 10.0);
        let v1 = vd(10.0, 0.0, 10.0);
        let v2 = vd(20.0, 0.0, 0.0);
        ms.calc_join(&mut vc, &v0, &v1, &v2, 10.0, 10.0);
        assert_eq!(vc.len(), 1);
        assert!((vc[0].x - 10.0).abs() < 1e-9);
        assert!((vc[0].y + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reversal_uses_fallback() {
        let mut ms = MathStroke::new();
        ms.set_joiner(Joiner::miter());
        let mut vc = Vec::new();
        let v0 = vd(0.0, 0.0, 10.0);
        let v1 = vd(10.0, 0.0, 10.0);
        let v2 = vd(0.0, 0.0, 0.0);
        ms.calc_join(&mut vc, &v0, &v1, &v2, 10.0, 10.0);
        assert!(vc.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert_eq!(vc.len(), 2);
    }
}
