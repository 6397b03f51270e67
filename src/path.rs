//! Path model.
//!
//! A `Path` is an ordered list of segments (lines, quadratic and cubic
//! Béziers, elliptical arcs) grouped into sub-paths, in a Y-up coordinate
//! space. Transforms are pure: they return a new path and never touch the
//! receiver, so one path value can be drawn at many positions.
//!
//! Every sub-path starts with an explicit `MoveTo`; the builder inserts one
//! when a drawing segment follows a `Close` or an empty path.

use core::fmt::{self, Write as _};

use crate::basics::{
    deg2rad, rad2deg, PointD, VertexSource, PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO,
    PATH_CMD_STOP, PATH_FLAGS_CLOSE,
};
use crate::curves::{svg_arc_to_cubics, Curve3Div, Curve4Div};
use crate::trans_affine::TransAffine;

// ============================================================================
// Number formatting
// ============================================================================

/// Display adapter for coordinates in every text encoding: at most six
/// decimals, no exponent, no trailing zeros, and `-0` printed as `0`.
#[derive(Debug, Clone, Copy)]
pub struct Num(pub f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_finite() {
            return f.write_str("0");
        }
        let s = format!("{:.6}", self.0);
        let s = if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.')
        } else {
            s.as_str()
        };
        if s == "-0" {
            f.write_str("0")
        } else {
            f.write_str(s)
        }
    }
}

// ============================================================================
// Segments
// ============================================================================

/// One path command with its absolute end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(PointD),
    LineTo(PointD),
    /// Control point, end point.
    QuadTo(PointD, PointD),
    /// First control point, second control point, end point.
    CubeTo(PointD, PointD, PointD),
    /// Elliptical arc in SVG endpoint parameterization. `rotation` is the
    /// x-axis rotation of the ellipse in degrees.
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: PointD,
    },
    Close,
}

impl Segment {
    fn is_drawing(&self) -> bool {
        !matches!(self, Segment::MoveTo(_) | Segment::Close)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: PointD,
    pub max: PointD,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A flattened sub-path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<PointD>,
    pub closed: bool,
}

// ============================================================================
// Path
// ============================================================================

/// An ordered sequence of sub-paths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<Segment>,
    start: PointD,
    current: PointD,
}

impl Path {
    /// Flattening tolerance in document units used by the stroking and
    /// dashing kernel.
    pub const DEFAULT_TOLERANCE: f64 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Start a new sub-path at `(x, y)`. Consecutive moves collapse.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let p = PointD::new(x, y);
        if let Some(Segment::MoveTo(last)) = self.segments.last_mut() {
            *last = p;
        } else {
            self.segments.push(Segment::MoveTo(p));
        }
        self.start = p;
        self.current = p;
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.ensure_subpath();
        let p = PointD::new(x, y);
        self.segments.push(Segment::LineTo(p));
        self.current = p;
        self
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        self.ensure_subpath();
        let p = PointD::new(x, y);
        self.segments.push(Segment::QuadTo(PointD::new(cx, cy), p));
        self.current = p;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cube_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        self.ensure_subpath();
        let p = PointD::new(x, y);
        self.segments
            .push(Segment::CubeTo(PointD::new(c1x, c1y), PointD::new(c2x, c2y), p));
        self.current = p;
        self
    }

    /// Elliptical arc to `(x, y)`; `rotation` is in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> &mut Self {
        self.ensure_subpath();
        let end = PointD::new(x, y);
        self.segments.push(Segment::ArcTo {
            rx: rx.abs(),
            ry: ry.abs(),
            rotation,
            large_arc,
            sweep,
            end,
        });
        self.current = end;
        self
    }

    /// Close the current sub-path. Ignored when it has no drawing segment.
    pub fn close(&mut self) -> &mut Self {
        if matches!(self.segments.last(), Some(s) if s.is_drawing()) {
            self.segments.push(Segment::Close);
            self.current = self.start;
        }
        self
    }

    /// Append all sub-paths of `other`.
    pub fn append(&mut self, other: &Path) -> &mut Self {
        if other.segments.is_empty() {
            return self;
        }
        if let Some(Segment::MoveTo(_)) = self.segments.last() {
            self.segments.pop();
        }
        self.segments.extend_from_slice(&other.segments);
        self.start = other.start;
        self.current = other.current;
        self
    }

    fn ensure_subpath(&mut self) {
        if matches!(self.segments.last(), None | Some(Segment::Close)) {
            self.segments.push(Segment::MoveTo(self.current));
            self.start = self.current;
        }
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    /// Rectangle with one corner at the origin.
    pub fn rectangle(w: f64, h: f64) -> Path {
        let mut p = Path::new();
        p.move_to(0.0, 0.0)
            .line_to(w, 0.0)
            .line_to(w, h)
            .line_to(0.0, h)
            .close();
        p
    }

    /// Rectangle with one corner at the origin and rounded corners of radius `r`.
    pub fn rounded_rectangle(w: f64, h: f64, r: f64) -> Path {
        let r = r.min(w.abs() / 2.0).min(h.abs() / 2.0);
        if r <= 0.0 {
            return Self::rectangle(w, h);
        }
        let mut p = Path::new();
        p.move_to(r, 0.0)
            .line_to(w - r, 0.0)
            .arc_to(r, r, 0.0, false, true, w, r)
            .line_to(w, h - r)
            .arc_to(r, r, 0.0, false, true, w - r, h)
            .line_to(r, h)
            .arc_to(r, r, 0.0, false, true, 0.0, h - r)
            .line_to(0.0, r)
            .arc_to(r, r, 0.0, false, true, r, 0.0)
            .close();
        p
    }

    /// Ellipse centered at the origin.
    pub fn ellipse(rx: f64, ry: f64) -> Path {
        let mut p = Path::new();
        p.move_to(rx, 0.0)
            .arc_to(rx, ry, 0.0, false, true, -rx, 0.0)
            .arc_to(rx, ry, 0.0, false, true, rx, 0.0)
            .close();
        p
    }

    /// Straight segments through `points`.
    pub fn polyline(points: &[PointD], closed: bool) -> Path {
        let mut p = Path::new();
        let Some((first, rest)) = points.split_first() else {
            return p;
        };
        p.move_to(first.x, first.y);
        for pt in rest {
            p.line_to(pt.x, pt.y);
        }
        if closed {
            p.close();
        }
        p
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// True when the path has no drawable segment.
    pub fn is_empty(&self) -> bool {
        !self.segments.iter().any(Segment::is_drawing)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the last sub-path ends with `Close`.
    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Close))
    }

    /// Start of the first sub-path.
    pub fn start_pos(&self) -> PointD {
        match self.segments.first() {
            Some(Segment::MoveTo(p)) => *p,
            _ => PointD::default(),
        }
    }

    /// Current point (end of the last segment).
    pub fn end_pos(&self) -> PointD {
        self.current
    }

    /// Bounds of the flattened geometry, or `None` for an empty path.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for poly in self.flatten(Self::DEFAULT_TOLERANCE) {
            for p in poly.points {
                let b = bounds.get_or_insert(Bounds { min: p, max: p });
                b.min.x = b.min.x.min(p.x);
                b.min.y = b.min.y.min(p.y);
                b.max.x = b.max.x.max(p.x);
                b.max.y = b.max.y.max(p.y);
            }
        }
        bounds
    }

    /// Component-wise comparison of two paths within `eps`.
    pub fn approx_eq(&self, other: &Path, eps: f64) -> bool {
        let eq = |a: PointD, b: PointD| a.equals_eps(b, eps);
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| match (a, b) {
                    (Segment::MoveTo(p), Segment::MoveTo(q))
                    | (Segment::LineTo(p), Segment::LineTo(q)) => eq(*p, *q),
                    (Segment::QuadTo(c, p), Segment::QuadTo(d, q)) => eq(*c, *d) && eq(*p, *q),
                    (Segment::CubeTo(c1, c2, p), Segment::CubeTo(d1, d2, q)) => {
                        eq(*c1, *d1) && eq(*c2, *d2) && eq(*p, *q)
                    }
                    (
                        Segment::ArcTo {
                            rx,
                            ry,
                            rotation,
                            large_arc,
                            sweep,
                            end,
                        },
                        Segment::ArcTo {
                            rx: rx2,
                            ry: ry2,
                            rotation: rot2,
                            large_arc: large2,
                            sweep: sweep2,
                            end: end2,
                        },
                    ) => {
                        (rx - rx2).abs() <= eps
                            && (ry - ry2).abs() <= eps
                            && (rotation - rot2).abs() <= eps
                            && large_arc == large2
                            && sweep == sweep2
                            && eq(*end, *end2)
                    }
                    (Segment::Close, Segment::Close) => true,
                    _ => false,
                })
    }

    // ------------------------------------------------------------------
    // Pure transforms
    // ------------------------------------------------------------------

    /// Copy translated by `(x, y)`. Arcs are carried over unchanged.
    pub fn translate(&self, x: f64, y: f64) -> Path {
        let d = PointD::new(x, y);
        let segments = self
            .segments
            .iter()
            .map(|seg| match *seg {
                Segment::MoveTo(p) => Segment::MoveTo(p + d),
                Segment::LineTo(p) => Segment::LineTo(p + d),
                Segment::QuadTo(c, p) => Segment::QuadTo(c + d, p + d),
                Segment::CubeTo(c1, c2, p) => Segment::CubeTo(c1 + d, c2 + d, p + d),
                Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end: end + d,
                },
                Segment::Close => Segment::Close,
            })
            .collect();
        Path {
            segments,
            start: self.start + d,
            current: self.current + d,
        }
    }

    /// Copy scaled about the origin.
    pub fn scale(&self, sx: f64, sy: f64) -> Path {
        self.transform(&TransAffine::new_scaling(sx, sy))
    }

    /// Copy rotated by `degrees` counter-clockwise about `(cx, cy)`.
    pub fn rotate(&self, degrees: f64, cx: f64, cy: f64) -> Path {
        let mut m = TransAffine::new_translation(-cx, -cy);
        m.rotate(deg2rad(degrees)).translate(cx, cy);
        self.transform(&m)
    }

    /// Copy mapped through an arbitrary affine matrix.
    ///
    /// Arcs stay arcs whenever the images of the ellipse axes remain
    /// perpendicular (similarities, and axis-aligned scaling of an
    /// axis-aligned ellipse); otherwise they become cubic Béziers.
    pub fn transform(&self, m: &TransAffine) -> Path {
        let tp = |p: PointD| {
            let (mut x, mut y) = (p.x, p.y);
            m.transform(&mut x, &mut y);
            PointD::new(x, y)
        };
        let mut segments = Vec::with_capacity(self.segments.len());
        let mut start = PointD::default();
        let mut current = PointD::default();
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => {
                    segments.push(Segment::MoveTo(tp(p)));
                    start = p;
                    current = p;
                }
                Segment::LineTo(p) => {
                    segments.push(Segment::LineTo(tp(p)));
                    current = p;
                }
                Segment::QuadTo(c, p) => {
                    segments.push(Segment::QuadTo(tp(c), tp(p)));
                    current = p;
                }
                Segment::CubeTo(c1, c2, p) => {
                    segments.push(Segment::CubeTo(tp(c1), tp(c2), tp(p)));
                    current = p;
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    match transform_arc(m, rx, ry, rotation, sweep) {
                        Some((rx, ry, rotation, sweep)) => segments.push(Segment::ArcTo {
                            rx,
                            ry,
                            rotation,
                            large_arc,
                            sweep,
                            end: tp(end),
                        }),
                        None => {
                            let cubics = svg_arc_to_cubics(
                                current,
                                rx,
                                ry,
                                deg2rad(rotation),
                                large_arc,
                                sweep,
                                end,
                            );
                            for [c1, c2, p] in cubics {
                                segments.push(Segment::CubeTo(tp(c1), tp(c2), tp(p)));
                            }
                        }
                    }
                    current = end;
                }
                Segment::Close => {
                    segments.push(Segment::Close);
                    current = start;
                }
            }
        }
        Path {
            segments,
            start: tp(self.start),
            current: tp(self.current),
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// SVG path data (`M`, `L`, `Q`, `C`, `A`, `z`).
    pub fn to_svg(&self) -> String {
        let mut s = String::new();
        for seg in &self.segments {
            // Writing into a String cannot fail.
            let _ = match *seg {
                Segment::MoveTo(p) => write!(s, "M{} {}", Num(p.x), Num(p.y)),
                Segment::LineTo(p) => write!(s, "L{} {}", Num(p.x), Num(p.y)),
                Segment::QuadTo(c, p) => {
                    write!(s, "Q{} {} {} {}", Num(c.x), Num(c.y), Num(p.x), Num(p.y))
                }
                Segment::CubeTo(c1, c2, p) => write!(
                    s,
                    "C{} {} {} {} {} {}",
                    Num(c1.x),
                    Num(c1.y),
                    Num(c2.x),
                    Num(c2.y),
                    Num(p.x),
                    Num(p.y)
                ),
                Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => write!(
                    s,
                    "A{} {} {} {} {} {} {}",
                    Num(rx),
                    Num(ry),
                    Num(rotation),
                    large_arc as u8,
                    sweep as u8,
                    Num(end.x),
                    Num(end.y)
                ),
                Segment::Close => write!(s, "z"),
            };
        }
        s
    }

    /// PDF path construction operators (`m`, `l`, `c`, `h`).
    pub fn to_pdf(&self) -> String {
        self.to_operators(["m", "l", "c", "h"])
    }

    /// PostScript path construction operators.
    pub fn to_ps(&self) -> String {
        self.to_operators(["moveto", "lineto", "curveto", "closepath"])
    }

    fn to_operators(&self, [m, l, c, h]: [&str; 4]) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());
        let cubic = |c1: PointD, c2: PointD, p: PointD| {
            format!(
                "{} {} {} {} {} {} {c}",
                Num(c1.x),
                Num(c1.y),
                Num(c2.x),
                Num(c2.y),
                Num(p.x),
                Num(p.y)
            )
        };
        let mut start = PointD::default();
        let mut current = PointD::default();
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => {
                    parts.push(format!("{} {} {m}", Num(p.x), Num(p.y)));
                    start = p;
                    current = p;
                }
                Segment::LineTo(p) => {
                    parts.push(format!("{} {} {l}", Num(p.x), Num(p.y)));
                    current = p;
                }
                Segment::QuadTo(q, p) => {
                    // Degree elevation
                    let c1 = current + (q - current) * (2.0 / 3.0);
                    let c2 = p + (q - p) * (2.0 / 3.0);
                    parts.push(cubic(c1, c2, p));
                    current = p;
                }
                Segment::CubeTo(c1, c2, p) => {
                    parts.push(cubic(c1, c2, p));
                    current = p;
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    for [c1, c2, p] in
                        svg_arc_to_cubics(current, rx, ry, deg2rad(rotation), large_arc, sweep, end)
                    {
                        parts.push(cubic(c1, c2, p));
                    }
                    current = end;
                }
                Segment::Close => {
                    parts.push(h.to_string());
                    current = start;
                }
            }
        }
        parts.join(" ")
    }

    // ------------------------------------------------------------------
    // Flattening
    // ------------------------------------------------------------------

    /// Flatten into polylines whose chords deviate from the curves by at
    /// most `tolerance`. Sub-paths with fewer than two points are dropped.
    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut poly = Polyline::default();
        let mut curve3 = Curve3Div::with_tolerance(tolerance);
        let mut curve4 = Curve4Div::with_tolerance(tolerance);
        let mut current = PointD::default();
        let mut start = PointD::default();

        let finish = |poly: &mut Polyline, out: &mut Vec<Polyline>| {
            let poly = core::mem::take(poly);
            if poly.points.len() > 1 {
                out.push(poly);
            }
        };

        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => {
                    finish(&mut poly, &mut out);
                    poly.points.push(p);
                    start = p;
                    current = p;
                }
                Segment::LineTo(p) => {
                    poly.points.push(p);
                    current = p;
                }
                Segment::QuadTo(c, p) => {
                    curve3.init(current.x, current.y, c.x, c.y, p.x, p.y);
                    poly.points.extend_from_slice(&curve3.points()[1..]);
                    current = p;
                }
                Segment::CubeTo(c1, c2, p) => {
                    curve4.init(current.x, current.y, c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                    poly.points.extend_from_slice(&curve4.points()[1..]);
                    current = p;
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    let mut from = current;
                    for [c1, c2, p] in
                        svg_arc_to_cubics(current, rx, ry, deg2rad(rotation), large_arc, sweep, end)
                    {
                        curve4.init(from.x, from.y, c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                        poly.points.extend_from_slice(&curve4.points()[1..]);
                        from = p;
                    }
                    current = end;
                }
                Segment::Close => {
                    poly.closed = true;
                    finish(&mut poly, &mut out);
                    current = start;
                }
            }
        }
        finish(&mut poly, &mut out);
        out
    }

    /// Flattened vertex stream for the rasterizer.
    pub fn vertices(&self, tolerance: f64) -> PathVertices {
        PathVertices::new(self.flatten(tolerance))
    }
}

/// Radii, rotation and sweep of an arc mapped through `m`, or `None` when
/// the images of the ellipse axes are no longer perpendicular.
fn transform_arc(
    m: &TransAffine,
    rx: f64,
    ry: f64,
    rotation: f64,
    sweep: bool,
) -> Option<(f64, f64, f64, bool)> {
    let phi = deg2rad(rotation);
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (mut ux, mut uy) = (cos_phi, sin_phi);
    let (mut vx, mut vy) = (-sin_phi, cos_phi);
    m.transform_2x2(&mut ux, &mut uy);
    m.transform_2x2(&mut vx, &mut vy);
    let lu = (ux * ux + uy * uy).sqrt();
    let lv = (vx * vx + vy * vy).sqrt();
    if lu == 0.0 || lv == 0.0 || (ux * vx + uy * vy).abs() > 1e-9 * lu * lv {
        return None;
    }
    let rotation = if uy == 0.0 && ux > 0.0 {
        0.0
    } else {
        rad2deg(uy.atan2(ux))
    };
    Some((rx * lu, ry * lv, rotation, sweep ^ (m.determinant() < 0.0)))
}

// ============================================================================
// PathVertices
// ============================================================================

/// `VertexSource` over the polylines of a flattened path.
pub struct PathVertices {
    polylines: Vec<Polyline>,
    poly: usize,
    point: usize,
}

impl PathVertices {
    pub fn new(polylines: Vec<Polyline>) -> Self {
        Self {
            polylines,
            poly: 0,
            point: 0,
        }
    }
}

impl VertexSource for PathVertices {
    fn rewind(&mut self) {
        self.poly = 0;
        self.point = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        loop {
            let Some(poly) = self.polylines.get(self.poly) else {
                return PATH_CMD_STOP;
            };
            if let Some(p) = poly.points.get(self.point) {
                *x = p.x;
                *y = p.y;
                self.point += 1;
                return if self.point == 1 {
                    PATH_CMD_MOVE_TO
                } else {
                    PATH_CMD_LINE_TO
                };
            }
            let closed = poly.closed;
            self.poly += 1;
            self.point = 0;
            if closed {
                return PATH_CMD_END_POLY | PATH_FLAGS_CLOSE;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::is_close;

    fn triangle() -> Path {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(5.0, 8.0).close();
        p
    }

    #[test]
    fn test_num_format() {
        assert_eq!(Num(1.0).to_string(), "1");
        assert_eq!(Num(-0.0).to_string(), "0");
        assert_eq!(Num(-0.0000001).to_string(), "0");
        assert_eq!(Num(0.5).to_string(), "0.5");
        assert_eq!(Num(1e-7).to_string(), "0");
        assert_eq!(Num(123456789.0).to_string(), "123456789");
        assert_eq!(Num(1.0 / 3.0).to_string(), "0.333333");
        assert_eq!(Num(-2.25).to_string(), "-2.25");
    }

    #[test]
    fn test_empty_path() {
        let mut p = Path::new();
        assert!(p.is_empty());
        p.move_to(5.0, 5.0);
        assert!(p.is_empty());
        p.close();
        assert!(p.is_empty());
        assert_eq!(p.segments().len(), 1);
    }

    #[test]
    fn test_builder_inserts_move_after_close() {
        let mut p = triangle();
        p.line_to(0.0, 10.0);
        assert_eq!(p.segments()[4], Segment::MoveTo(PointD::new(0.0, 0.0)));
        assert!(!p.is_closed());
    }

    #[test]
    fn test_consecutive_moves_collapse() {
        let mut p = Path::new();
        p.move_to(1.0, 1.0).move_to(2.0, 2.0).line_to(3.0, 3.0);
        assert_eq!(p.segments().len(), 2);
        assert_eq!(p.start_pos(), PointD::new(2.0, 2.0));
    }

    #[test]
    fn test_translate_is_pure() {
        let p = triangle();
        let q = p.translate(3.0, 4.0);
        assert_eq!(p, triangle());
        assert_eq!(q.segments()[1], Segment::LineTo(PointD::new(13.0, 4.0)));
        assert_eq!(p.translate(0.0, 0.0), p);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Path::rectangle(2.0, 1.0).rotate(90.0, 0.0, 0.0);
        let expected = Path::polyline(
            &[
                PointD::new(0.0, 0.0),
                PointD::new(0.0, 2.0),
                PointD::new(-1.0, 2.0),
                PointD::new(-1.0, 0.0),
            ],
            true,
        );
        assert!(p.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_scale_keeps_arcs_for_axis_aligned_ellipse() {
        let p = Path::ellipse(2.0, 1.0).scale(3.0, 2.0);
        match p.segments()[1] {
            Segment::ArcTo { rx, ry, end, .. } => {
                assert!((rx - 6.0).abs() < 1e-12);
                assert!((ry - 2.0).abs() < 1e-12);
                assert_eq!(end, PointD::new(-6.0, 0.0));
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn test_flip_reverses_sweep() {
        let p = Path::ellipse(1.0, 1.0).scale(1.0, -1.0);
        match p.segments()[1] {
            Segment::ArcTo { sweep, .. } => assert!(!sweep),
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn test_skew_converts_arcs_to_cubics() {
        let m = TransAffine::new_custom(1.0, 0.0, 0.5, 1.0, 0.0, 0.0);
        let p = Path::ellipse(2.0, 1.0).transform(&m);
        assert!(p
            .segments()
            .iter()
            .all(|s| !matches!(s, Segment::ArcTo { .. })));
        assert!(p.segments().iter().any(|s| matches!(s, Segment::CubeTo(..))));
    }

    #[test]
    fn test_to_svg() {
        assert_eq!(Path::rectangle(10.0, 10.0).to_svg(), "M0 0L10 0L10 10L0 10z");
        let mut p = Path::new();
        p.move_to(0.0, 0.0).arc_to(5.0, 5.0, 0.0, false, true, 10.0, 0.0);
        assert_eq!(p.to_svg(), "M0 0A5 5 0 0 1 10 0");
    }

    #[test]
    fn test_to_pdf_and_ps() {
        let p = Path::rectangle(10.0, 5.0);
        assert_eq!(p.to_pdf(), "0 0 m 10 0 l 10 5 l 0 5 l h");
        assert_eq!(
            p.to_ps(),
            "0 0 moveto 10 0 lineto 10 5 lineto 0 5 lineto closepath"
        );
    }

    #[test]
    fn test_quad_degree_elevation() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).quad_to(3.0, 3.0, 6.0, 0.0);
        assert_eq!(p.to_pdf(), "0 0 m 2 2 4 2 6 0 c");
    }

    #[test]
    fn test_flatten_rectangle() {
        let polys = Path::rectangle(4.0, 2.0).flatten(0.1);
        assert_eq!(polys.len(), 1);
        assert!(polys[0].closed);
        assert_eq!(polys[0].points.len(), 4);
    }

    #[test]
    fn test_flatten_ellipse_stays_on_ellipse() {
        let polys = Path::ellipse(10.0, 5.0).flatten(0.01);
        assert_eq!(polys.len(), 1);
        for p in &polys[0].points {
            let v = (p.x / 10.0).powi(2) + (p.y / 5.0).powi(2);
            assert!((v - 1.0).abs() < 0.01, "point {p:?} off the ellipse");
        }
    }

    #[test]
    fn test_bounds() {
        let b = Path::ellipse(10.0, 5.0).translate(20.0, 20.0).bounds().unwrap();
        assert!((b.min.x - 10.0).abs() < 1e-6);
        assert!((b.max.y - 25.0).abs() < 1e-6);
        assert!((b.width() - 20.0).abs() < 1e-6);
        assert!(Path::new().bounds().is_none());
    }

    #[test]
    fn test_path_vertices() {
        let mut vs = triangle().vertices(0.1);
        vs.rewind();
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(vs.vertex(&mut x, &mut y), PATH_CMD_MOVE_TO);
        assert_eq!(vs.vertex(&mut x, &mut y), PATH_CMD_LINE_TO);
        assert_eq!(vs.vertex(&mut x, &mut y), PATH_CMD_LINE_TO);
        assert!((x - 5.0).abs() < 1e-12 && (y - 8.0).abs() < 1e-12);
        assert!(is_close(vs.vertex(&mut x, &mut y)));
        assert_eq!(vs.vertex(&mut x, &mut y), PATH_CMD_STOP);
    }

    #[test]
    fn test_append() {
        let mut p = triangle();
        p.append(&Path::rectangle(1.0, 1.0).translate(20.0, 0.0));
        assert_eq!(p.flatten(0.1).len(), 2);
        assert_eq!(p.end_pos(), PointD::new(20.0, 0.0));
    }
}
