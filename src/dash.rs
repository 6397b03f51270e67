//! Dash generator.
//!
//! Splits each flattened sub-path into the "on" runs of a repeating
//! dash/gap pattern. The pattern restarts at `offset` for every sub-path.

use crate::basics::PointD;
use crate::math::{VertexDist, VertexSequence};
use crate::path::{Path, Polyline};

// ============================================================================
// Dasher
// ============================================================================

/// Dash pattern walker over flattened sub-paths.
pub struct Dasher {
    dashes: Vec<f64>,
    dash_start: f64,
    curr_dash: usize,
    curr_dash_start: f64,
    src_vertices: VertexSequence,
}

impl Dasher {
    /// Build a dasher, or `None` when the pattern should be drawn solid.
    ///
    /// Odd-length patterns are repeated once to make them even. Negative
    /// offsets wrap into the pattern.
    pub fn new(offset: f64, dashes: &[f64]) -> Option<Self> {
        let dashes = normalize_dashes(dashes)?;
        let total: f64 = dashes.iter().sum();
        let dash_start = if offset.is_finite() {
            offset.rem_euclid(total)
        } else {
            0.0
        };
        Some(Self {
            dashes,
            dash_start,
            curr_dash: 0,
            curr_dash_start: 0.0,
            src_vertices: VertexSequence::new(),
        })
    }

    fn calc_dash_start(&mut self, mut ds: f64) {
        self.curr_dash = 0;
        self.curr_dash_start = 0.0;
        while ds > 0.0 {
            if ds > self.dashes[self.curr_dash] {
                ds -= self.dashes[self.curr_dash];
                self.curr_dash = (self.curr_dash + 1) % self.dashes.len();
                self.curr_dash_start = 0.0;
            } else {
                self.curr_dash_start = ds;
                ds = 0.0;
            }
        }
    }

    /// Even indices are dashes, odd indices are gaps.
    fn is_on(&self) -> bool {
        self.curr_dash % 2 == 0
    }

    /// Push the "on" runs of one sub-path into `out` as open polylines.
    ///
    /// On a closed sub-path a dash running through the start vertex is
    /// emitted as one run.
    pub fn dash_polyline(&mut self, poly: &Polyline, out: &mut Vec<Polyline>) {
        self.src_vertices.clear();
        for p in &poly.points {
            self.src_vertices.add(VertexDist::new(p.x, p.y));
        }
        self.src_vertices.close(poly.closed);
        let n = self.src_vertices.size();
        if n < 2 {
            return;
        }
        let edges = if poly.closed { n } else { n - 1 };

        self.calc_dash_start(self.dash_start);
        let first = out.len();
        let starts_on = self.is_on();
        let mut run: Vec<PointD> = Vec::new();
        if starts_on {
            run.push(self.src_vertices[0].point());
        }

        for e in 0..edges {
            let v1 = self.src_vertices[e];
            let v2 = *self.src_vertices.next(e);
            let len = v1.dist;
            let mut rest = len;
            loop {
                let dash_rest = self.dashes[self.curr_dash] - self.curr_dash_start;
                if rest > dash_rest {
                    rest -= dash_rest;
                    let p = PointD::new(
                        v2.x - (v2.x - v1.x) * rest / len,
                        v2.y - (v2.y - v1.y) * rest / len,
                    );
                    if self.is_on() {
                        run.push(p);
                        out.push(Polyline {
                            points: core::mem::take(&mut run),
                            closed: false,
                        });
                    } else {
                        run.push(p);
                    }
                    self.curr_dash = (self.curr_dash + 1) % self.dashes.len();
                    self.curr_dash_start = 0.0;
                } else {
                    self.curr_dash_start += rest;
                    if self.is_on() {
                        run.push(v2.point());
                    }
                    break;
                }
            }
        }

        if self.is_on() && run.len() > 1 {
            if poly.closed && starts_on && out.len() > first {
                // The last run ends at the start vertex where the first began.
                run.extend_from_slice(&out[first].points[1..]);
                out[first].points = run;
            } else {
                out.push(Polyline {
                    points: run,
                    closed: false,
                });
            }
        }
    }
}

/// Validated, even-length dash array, or `None` for a solid line.
///
/// Empty arrays are solid. Arrays with a negative or non-finite entry, or
/// whose entries sum to zero, are logged and treated as solid.
pub fn normalize_dashes(dashes: &[f64]) -> Option<Vec<f64>> {
    if dashes.is_empty() {
        return None;
    }
    if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
        log::warn!("dash array {dashes:?} has negative or non-finite entries, drawing solid");
        return None;
    }
    let total: f64 = dashes.iter().sum();
    if !(total > 0.0) {
        log::warn!("dash array {dashes:?} has zero length, drawing solid");
        return None;
    }
    let mut out = dashes.to_vec();
    if out.len() % 2 == 1 {
        out.extend_from_slice(dashes);
    }
    Some(out)
}

// ============================================================================
// Path API
// ============================================================================

impl Path {
    /// The "on" runs of this path under the dash pattern, merged into one
    /// path of open sub-paths. An empty or invalid pattern returns the
    /// path unchanged.
    pub fn dash(&self, offset: f64, dashes: &[f64]) -> Path {
        let Some(mut dasher) = Dasher::new(offset, dashes) else {
            return self.clone();
        };
        let mut out = Path::new();
        for run in dash_runs(self, &mut dasher) {
            out.append(&Path::polyline(&run.points, false));
        }
        out
    }

    /// Like [`Path::dash`] but with one path per dash.
    pub fn dash_segments(&self, offset: f64, dashes: &[f64]) -> Vec<Path> {
        let Some(mut dasher) = Dasher::new(offset, dashes) else {
            return vec![self.clone()];
        };
        dash_runs(self, &mut dasher)
            .iter()
            .map(|run| Path::polyline(&run.points, false))
            .collect()
    }
}

fn dash_runs(path: &Path, dasher: &mut Dasher) -> Vec<Polyline> {
    let mut runs = Vec::new();
    for poly in path.flatten(Path::DEFAULT_TOLERANCE) {
        dasher.dash_polyline(&poly, &mut runs);
    }
    runs
}

// ============================================================================
// Tests
// ============================================================================
