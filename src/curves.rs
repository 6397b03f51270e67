//! Bezier curve flattening and elliptical arc conversion.
//!
//! Quadratic and cubic Béziers are flattened by recursive subdivision: a
//! sub-curve is replaced by a chord once its control points lie within the
//! distance tolerance of that chord. Elliptical arcs in SVG endpoint form
//! are converted to at most four cubic Béziers.

use crate::basics::{PointD, VertexSource, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PI};
use crate::math::calc_sq_distance;
use crate::trans_affine::TransAffine;

const CURVE_COLLINEARITY_EPSILON: f64 = 1e-30;
const CURVE_RECURSION_LIMIT: u32 = 32;

/// Epsilon to prevent adding degenerate curves.
const BEZIER_ARC_ANGLE_EPSILON: f64 = 0.01;

/// Default flattening tolerance (maximum chord deviation).
pub const DEFAULT_CURVE_TOLERANCE: f64 = 0.5;

/// Smallest tolerance accepted by the flatteners and the stroker.
pub const MIN_TOLERANCE: f64 = 1e-4;

/// Clamp a flattening tolerance to at least [`MIN_TOLERANCE`]. Zero,
/// negative and NaN tolerances all map to the minimum.
pub fn clamp_tolerance(tolerance: f64) -> f64 {
    if tolerance > MIN_TOLERANCE {
        tolerance
    } else {
        MIN_TOLERANCE
    }
}

// ============================================================================
// Curve3Div: recursive subdivision quadratic Bezier
// ============================================================================

/// Recursive subdivision quadratic Bezier curve flattener.
pub struct Curve3Div {
    distance_tolerance_square: f64,
    count: usize,
    points: Vec<PointD>,
}

impl Curve3Div {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_CURVE_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            distance_tolerance_square: clamp_tolerance(tolerance).powi(2),
            count: 0,
            points: Vec::new(),
        }
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.distance_tolerance_square = clamp_tolerance(tolerance).powi(2);
    }

    pub fn init(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.points.clear();
        self.count = 0;
        self.points.push(PointD::new(x1, y1));
        self.recursive_bezier(x1, y1, x2, y2, x3, y3, 0);
        self.points.push(PointD::new(x3, y3));
    }

    /// Flattened points, including both end points.
    pub fn points(&self) -> &[PointD] {
        &self.points
    }

    #[allow(clippy::too_many_arguments)]
    fn recursive_bezier(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        level: u32,
    ) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }

        let x12 = (x1 + x2) / 2.0;
        let y12 = (y1 + y2) / 2.0;
        let x23 = (x2 + x3) / 2.0;
        let y23 = (y2 + y3) / 2.0;
        let x123 = (x12 + x23) / 2.0;
        let y123 = (y12 + y23) / 2.0;

        let dx = x3 - x1;
        let dy = y3 - y1;
        let d = ((x2 - x3) * dy - (y2 - y3) * dx).abs();

        if d > CURVE_COLLINEARITY_EPSILON {
            if d * d <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                self.points.push(PointD::new(x123, y123));
                return;
            }
        } else {
            // Collinear case
            let da = dx * dx + dy * dy;
            let d_val = if da == 0.0 {
                calc_sq_distance(x1, y1, x2, y2)
            } else {
                let t = ((x2 - x1) * dx + (y2 - y1) * dy) / da;
                if t > 0.0 && t < 1.0 {
                    // Simple collinear case, 1---2---3
                    return;
                }
                if t <= 0.0 {
                    calc_sq_distance(x2, y2, x1, y1)
                } else {
                    calc_sq_distance(x2, y2, x3, y3)
                }
            };
            if d_val < self.distance_tolerance_square {
                self.points.push(PointD::new(x2, y2));
                return;
            }
        }

        self.recursive_bezier(x1, y1, x12, y12, x123, y123, level + 1);
        self.recursive_bezier(x123, y123, x23, y23, x3, y3, level + 1);
    }
}

impl Default for Curve3Div {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve3Div {
    fn rewind(&mut self) {
        self.count = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        next_point(&self.points, &mut self.count, x, y)
    }
}

// ============================================================================
// Curve4Div: recursive subdivision cubic Bezier
// ============================================================================

/// Recursive subdivision cubic Bezier curve flattener.
pub struct Curve4Div {
    distance_tolerance_square: f64,
    count: usize,
    points: Vec<PointD>,
}

impl Curve4Div {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_CURVE_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            distance_tolerance_square: clamp_tolerance(tolerance).powi(2),
            count: 0,
            points: Vec::new(),
        }
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.distance_tolerance_square = clamp_tolerance(tolerance).powi(2);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn init(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.points.clear();
        self.count = 0;
        self.points.push(PointD::new(x1, y1));
        self.recursive_bezier(x1, y1, x2, y2, x3, y3, x4, y4, 0);
        self.points.push(PointD::new(x4, y4));
    }

    pub fn points(&self) -> &[PointD] {
        &self.points
    }

    #[allow(clippy::too_many_arguments)]
    fn recursive_bezier(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        x4: f64,
        y4: f64,
        level: u32,
    ) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }

        let x12 = (x1 + x2) / 2.0;
        let y12 = (y1 + y2) / 2.0;
        let x23 = (x2 + x3) / 2.0;
        let y23 = (y2 + y3) / 2.0;
        let x34 = (x3 + x4) / 2.0;
        let y34 = (y3 + y4) / 2.0;
        let x123 = (x12 + x23) / 2.0;
        let y123 = (y12 + y23) / 2.0;
        let x234 = (x23 + x34) / 2.0;
        let y234 = (y23 + y34) / 2.0;
        let x1234 = (x123 + x234) / 2.0;
        let y1234 = (y123 + y234) / 2.0;

        let dx = x4 - x1;
        let dy = y4 - y1;

        let mut d2 = ((x2 - x4) * dy - (y2 - y4) * dx).abs();
        let mut d3 = ((x3 - x4) * dy - (y3 - y4) * dx).abs();

        let case = ((d2 > CURVE_COLLINEARITY_EPSILON) as u32) << 1
            | (d3 > CURVE_COLLINEARITY_EPSILON) as u32;

        match case {
            0 => {
                // All collinear OR p1==p4
                let k = dx * dx + dy * dy;
                if k == 0.0 {
                    d2 = calc_sq_distance(x1, y1, x2, y2);
                    d3 = calc_sq_distance(x4, y4, x3, y3);
                } else {
                    let k = 1.0 / k;
                    d2 = k * ((x2 - x1) * dx + (y2 - y1) * dy);
                    d3 = k * ((x3 - x1) * dx + (y3 - y1) * dy);
                    if d2 > 0.0 && d2 < 1.0 && d3 > 0.0 && d3 < 1.0 {
                        // Simple collinear case, 1---2---3---4
                        return;
                    }
                    d2 = if d2 <= 0.0 {
                        calc_sq_distance(x2, y2, x1, y1)
                    } else if d2 >= 1.0 {
                        calc_sq_distance(x2, y2, x4, y4)
                    } else {
                        calc_sq_distance(x2, y2, x1 + d2 * dx, y1 + d2 * dy)
                    };
                    d3 = if d3 <= 0.0 {
                        calc_sq_distance(x3, y3, x1, y1)
                    } else if d3 >= 1.0 {
                        calc_sq_distance(x3, y3, x4, y4)
                    } else {
                        calc_sq_distance(x3, y3, x1 + d3 * dx, y1 + d3 * dy)
                    };
                }
                if d2 > d3 {
                    if d2 < self.distance_tolerance_square {
                        self.points.push(PointD::new(x2, y2));
                        return;
                    }
                } else if d3 < self.distance_tolerance_square {
                    self.points.push(PointD::new(x3, y3));
                    return;
                }
            }
            1 => {
                // p1,p2,p4 are collinear, p3 is significant
                if d3 * d3 <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(PointD::new(x23, y23));
                    return;
                }
            }
            2 => {
                // p1,p3,p4 are collinear, p2 is significant
                if d2 * d2 <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(PointD::new(x23, y23));
                    return;
                }
            }
            _ => {
                if (d2 + d3) * (d2 + d3) <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                    self.points.push(PointD::new(x23, y23));
                    return;
                }
            }
        }

        self.recursive_bezier(x1, y1, x12, y12, x123, y123, x1234, y1234, level + 1);
        self.recursive_bezier(x1234, y1234, x234, y234, x34, y34, x4, y4, level + 1);
    }
}

impl Default for Curve4Div {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve4Div {
    fn rewind(&mut self) {
        self.count = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        next_point(&self.points, &mut self.count, x, y)
    }
}

fn next_point(points: &[PointD], count: &mut usize, x: &mut f64, y: &mut f64) -> u32 {
    let Some(p) = points.get(*count) else {
        return PATH_CMD_STOP;
    };
    *x = p.x;
    *y = p.y;
    *count += 1;
    if *count == 1 {
        PATH_CMD_MOVE_TO
    } else {
        PATH_CMD_LINE_TO
    }
}

// ============================================================================
// Elliptical arcs
// ============================================================================

/// One cubic segment: first control point, second control point, end point.
pub type CubicSegment = [PointD; 3];

/// Convert an arc segment of at most a quarter turn to a single cubic.
///
/// Writes 8 values to `curve`: `[x0, y0, x1, y1, x2, y2, x3, y3]`.
pub fn arc_to_bezier(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start_angle: f64,
    sweep_angle: f64,
    curve: &mut [f64; 8],
) {
    let x0 = (sweep_angle / 2.0).cos();
    let y0 = (sweep_angle / 2.0).sin();
    let tx = (1.0 - x0) * 4.0 / 3.0;
    let ty = y0 - tx * x0 / y0;

    let px = [x0, x0 + tx, x0 + tx, x0];
    let py = [-y0, -ty, ty, y0];

    let sn = (start_angle + sweep_angle / 2.0).sin();
    let cs = (start_angle + sweep_angle / 2.0).cos();

    for i in 0..4 {
        curve[i * 2] = cx + rx * (px[i] * cs - py[i] * sn);
        curve[i * 2 + 1] = cy + ry * (px[i] * sn + py[i] * cs);
    }
}

/// Cubic approximation of an axis-aligned elliptical arc around the origin,
/// split into quarter turns (at most four segments).
fn bezier_arc(rx: f64, ry: f64, mut start_angle: f64, sweep_angle: f64) -> Vec<CubicSegment> {
    let sweep_angle = sweep_angle.clamp(-2.0 * PI, 2.0 * PI);
    let mut out = Vec::with_capacity(4);
    if sweep_angle.abs() < 1e-10 {
        return out;
    }

    let mut total_sweep = 0.0;
    let mut curve = [0.0; 8];
    loop {
        let prev_sweep = total_sweep;
        let mut local_sweep;
        let mut done = false;
        if sweep_angle < 0.0 {
            local_sweep = -PI * 0.5;
            total_sweep -= PI * 0.5;
            if total_sweep <= sweep_angle + BEZIER_ARC_ANGLE_EPSILON {
                local_sweep = sweep_angle - prev_sweep;
                done = true;
            }
        } else {
            local_sweep = PI * 0.5;
            total_sweep += PI * 0.5;
            if total_sweep >= sweep_angle - BEZIER_ARC_ANGLE_EPSILON {
                local_sweep = sweep_angle - prev_sweep;
                done = true;
            }
        }

        arc_to_bezier(0.0, 0.0, rx, ry, start_angle, local_sweep, &mut curve);
        out.push([
            PointD::new(curve[2], curve[3]),
            PointD::new(curve[4], curve[5]),
            PointD::new(curve[6], curve[7]),
        ]);
        start_angle += local_sweep;

        if done || out.len() >= 4 {
            break;
        }
    }
    out
}

/// Convert an SVG endpoint-parameterized elliptical arc from `p0` to `p1`
/// into cubic segments.
///
/// `rotation` is the x-axis rotation of the ellipse in radians. Radii that
/// are too small to span the end points are scaled up. A zero radius
/// degrades to a straight line; coincident end points yield no segments.
#[allow(clippy::too_many_arguments)]
pub fn svg_arc_to_cubics(
    p0: PointD,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
    p1: PointD,
) -> Vec<CubicSegment> {
    if p0 == p1 {
        return Vec::new();
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx == 0.0 || ry == 0.0 {
        return vec![[p0, p1, p1]];
    }

    let dx2 = (p0.x - p1.x) / 2.0;
    let dy2 = (p0.y - p1.y) / 2.0;

    let (sin_a, cos_a) = rotation.sin_cos();

    // Rotate to align with axes
    let x1 = cos_a * dx2 + sin_a * dy2;
    let y1 = -sin_a * dx2 + cos_a * dy2;

    // Ensure radii are large enough
    let mut prx = rx * rx;
    let mut pry = ry * ry;
    let px1 = x1 * x1;
    let py1 = y1 * y1;

    let radii_check = px1 / prx + py1 / pry;
    if radii_check > 1.0 {
        rx *= radii_check.sqrt();
        ry *= radii_check.sqrt();
        prx = rx * rx;
        pry = ry * ry;
    }

    // Center in the rotated frame
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let sq = (prx * pry - prx * py1 - pry * px1) / (prx * py1 + pry * px1);
    let coef = sign * sq.max(0.0).sqrt();
    let cx1 = coef * ((rx * y1) / ry);
    let cy1 = coef * -((ry * x1) / rx);

    let sx2 = (p0.x + p1.x) / 2.0;
    let sy2 = (p0.y + p1.y) / 2.0;
    let cx = sx2 + (cos_a * cx1 - sin_a * cy1);
    let cy = sy2 + (sin_a * cx1 + cos_a * cy1);

    let ux = (x1 - cx1) / rx;
    let uy = (y1 - cy1) / ry;
    let vx = (-x1 - cx1) / rx;
    let vy = (-y1 - cy1) / ry;

    // Start angle
    let n = (ux * ux + uy * uy).sqrt();
    let sign = if uy < 0.0 { -1.0 } else { 1.0 };
    let start_angle = sign * (ux / n).clamp(-1.0, 1.0).acos();

    // Sweep angle
    let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
    let p = ux * vx + uy * vy;
    let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let mut sweep_angle = sign * (p / n).clamp(-1.0, 1.0).acos();

    if !sweep && sweep_angle > 0.0 {
        sweep_angle -= PI * 2.0;
    } else if sweep && sweep_angle < 0.0 {
        sweep_angle += PI * 2.0;
    }

    let mut mtx = TransAffine::new_rotation(rotation);
    mtx.multiply(&TransAffine::new_translation(cx, cy));

    let mut segments = bezier_arc(rx, ry, start_angle, sweep_angle);
    for seg in segments.iter_mut() {
        for p in seg.iter_mut() {
            mtx.transform(&mut p.x, &mut p.y);
        }
    }
    // Ensure an exact end point
    if let Some(last) = segments.last_mut() {
        last[2] = p1;
    } else {
        segments.push([p0, p1, p1]);
    }
    segments
}

// ============================================================================
// Tests
// ============================================================================
