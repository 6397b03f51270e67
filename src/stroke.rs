//! Stroke outline generator.
//!
//! Turns the center line of a path into filled outline contours using
//! `MathStroke` for the caps and joins. Open sub-paths become a single
//! contour (cap, one side, cap, other side). Closed sub-paths become an
//! outer and an inner contour of opposite orientation, so filling the
//! result with the non-zero rule paints exactly the stroked ring.

use crate::basics::PointD;
use crate::math::{VertexDist, VertexSequence};
use crate::math_stroke::MathStroke;
use crate::path::{Path, Polyline};
use crate::style::{Capper, DrawState, Joiner};

// ============================================================================
// Stroker
// ============================================================================

/// Stroke outline generator for flattened sub-paths.
pub struct Stroker {
    stroker: MathStroke,
    src_vertices: VertexSequence,
    out_vertices: Vec<PointD>,
    contour: Vec<PointD>,
}

impl Stroker {
    pub fn new(width: f64, capper: Capper, joiner: Joiner, tolerance: f64) -> Self {
        let mut stroker = MathStroke::new();
        stroker.set_width(width);
        stroker.set_capper(capper);
        stroker.set_joiner(joiner);
        stroker.set_tolerance(tolerance);
        Self {
            stroker,
            src_vertices: VertexSequence::new(),
            out_vertices: Vec::new(),
            contour: Vec::new(),
        }
    }

    /// Append the outline contours of one sub-path to `out`.
    ///
    /// Sub-paths that collapse to a single point after coincident vertices
    /// are removed produce nothing.
    pub fn stroke_polyline(&mut self, poly: &Polyline, out: &mut Path) {
        self.src_vertices.clear();
        for p in &poly.points {
            self.src_vertices.add(VertexDist::new(p.x, p.y));
        }
        let mut closed = poly.closed;
        self.src_vertices.close(closed);
        if closed && self.src_vertices.size() < 3 {
            closed = false;
            self.src_vertices.close(false);
        }
        let n = self.src_vertices.size();
        if n < 2 {
            return;
        }

        if closed {
            // Outline 1: forward joins around the loop.
            self.contour.clear();
            for i in 0..n {
                self.join(i, true);
            }
            emit(&self.contour, out);

            // Outline 2: reverse joins around the loop.
            self.contour.clear();
            for i in (0..n).rev() {
                self.join(i, false);
            }
            emit(&self.contour, out);
        } else {
            self.contour.clear();
            let v = &self.src_vertices;
            self.stroker
                .calc_cap(&mut self.out_vertices, &v[0], &v[1], v[0].dist);
            self.contour.extend_from_slice(&self.out_vertices);
            for i in 1..n - 1 {
                self.join(i, true);
            }
            let v = &self.src_vertices;
            self.stroker
                .calc_cap(&mut self.out_vertices, &v[n - 1], &v[n - 2], v[n - 2].dist);
            self.contour.extend_from_slice(&self.out_vertices);
            for i in (1..n - 1).rev() {
                self.join(i, false);
            }
            emit(&self.contour, out);
        }
    }

    fn join(&mut self, i: usize, forward: bool) {
        let v = &self.src_vertices;
        let (prev, curr, next) = (v.prev(i), v.curr(i), v.next(i));
        if forward {
            self.stroker
                .calc_join(&mut self.out_vertices, prev, curr, next, prev.dist, curr.dist);
        } else {
            self.stroker
                .calc_join(&mut self.out_vertices, next, curr, prev, curr.dist, prev.dist);
        }
        self.contour.extend_from_slice(&self.out_vertices);
    }
}

fn emit(contour: &[PointD], out: &mut Path) {
    let Some((first, rest)) = contour.split_first() else {
        return;
    };
    out.move_to(first.x, first.y);
    for p in rest {
        out.line_to(p.x, p.y);
    }
    out.close();
}

// ============================================================================
// Path API
// ============================================================================

impl Path {
    /// Outline of this path stroked with `width`, as a path to be filled
    /// with the non-zero rule. Curves are flattened with
    /// [`Path::DEFAULT_TOLERANCE`].
    pub fn stroke(&self, width: f64, capper: Capper, joiner: &Joiner) -> Path {
        self.stroke_with_tolerance(width, capper, joiner, Self::DEFAULT_TOLERANCE)
    }

    /// Like [`Path::stroke`] with an explicit flattening tolerance.
    /// A non-positive width yields an empty path.
    pub fn stroke_with_tolerance(
        &self,
        width: f64,
        capper: Capper,
        joiner: &Joiner,
        tolerance: f64,
    ) -> Path {
        let mut out = Path::new();
        if !(width > 0.0) {
            return out;
        }
        let mut stroker = Stroker::new(width, capper, joiner.clone(), tolerance);
        for poly in self.flatten(tolerance) {
            stroker.stroke_polyline(&poly, &mut out);
        }
        out
    }

    /// Outline of this path under the stroke settings of `state`, dashed
    /// first when the state carries a dash pattern.
    pub fn stroke_outline(&self, state: &DrawState, tolerance: f64) -> Path {
        let dashed;
        let center = if state.dashes.is_empty() {
            self
        } else {
            dashed = self.dash(state.dash_offset, &state.dashes);
            &dashed
        };
        center.stroke_with_tolerance(
            state.stroke_width,
            state.stroke_capper,
            &state.stroke_joiner,
            tolerance,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
