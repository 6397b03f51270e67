//! Geometric math utilities.
//!
//! Distances, intersections, cross products, and the coincident-filtering
//! vertex sequence used by the stroker and the dasher.

use crate::basics::PointD;

// ============================================================================
// Constants
// ============================================================================

/// Coinciding points maximal distance (epsilon).
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Epsilon for intersection calculations.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

// ============================================================================
// Cross product and distances
// ============================================================================

/// Cross product of vectors (x2-x1, y2-y1) and (x-x2, y-y2).
/// The sign indicates which side of the line (x1,y1)→(x2,y2) the point (x,y) is on.
#[inline]
pub fn cross_product(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> f64 {
    (x - x2) * (y2 - y1) - (y - y2) * (x2 - x1)
}

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn calc_sq_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Intersection point of the infinite lines (ax,ay)→(bx,by) and (cx,cy)→(dx,dy).
/// Returns `None` if they are parallel.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn calc_intersection(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
) -> Option<(f64, f64)> {
    let num = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let den = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some((ax + r * (bx - ax), ay + r * (by - ay)))
}

/// Signed area of a closed polygon (positive when counter-clockwise).
#[cfg(test)]
pub(crate) fn calc_polygon_area(vertices: &[PointD]) -> f64 {
    if vertices.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = vertices[vertices.len() - 1];
    for v in vertices {
        sum += prev.x * v.y - prev.y * v.x;
        prev = *v;
    }
    sum * 0.5
}

// ============================================================================
// Vertex with distance to its successor
// ============================================================================

/// A vertex that remembers the distance to the next vertex in its sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDist {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
}

impl VertexDist {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, dist: 0.0 }
    }

    /// Calculate distance to `val` and store it. Returns `true` if the
    /// points are not coincident (distance > VERTEX_DIST_EPSILON).
    /// If coincident, sets dist to `1.0 / VERTEX_DIST_EPSILON`.
    pub fn calc_dist(&mut self, val: &VertexDist) -> bool {
        self.dist = calc_distance(self.x, self.y, val.x, val.y);
        let ret = self.dist > VERTEX_DIST_EPSILON;
        if !ret {
            self.dist = 1.0 / VERTEX_DIST_EPSILON;
        }
        ret
    }

    #[inline]
    pub fn point(&self) -> PointD {
        PointD::new(self.x, self.y)
    }
}

// ============================================================================
// Vertex sequence
// ============================================================================

/// A polyline that drops coincident vertices as they are added.
///
/// The check is lazy: a vertex coincident with its predecessor is removed
/// when the next vertex arrives, or by [`close`](Self::close). After
/// `close`, every `dist` field holds the length of the edge leaving that
/// vertex (wrapping to the first vertex when closed).
#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add(&mut self, val: VertexDist) {
        if self.vertices.len() > 1 {
            let len = self.vertices.len();
            let last = self.vertices[len - 1];
            if !self.vertices[len - 2].calc_dist(&last) {
                self.vertices.pop();
            }
        }
        self.vertices.push(val);
    }

    pub fn modify_last(&mut self, val: VertexDist) {
        self.vertices.pop();
        self.add(val);
    }

    /// Remove trailing coincident vertices (and, for closed sequences, a
    /// last vertex that coincides with the first), then refresh distances.
    pub fn close(&mut self, closed: bool) {
        while self.vertices.len() > 1 {
            let len = self.vertices.len();
            let mut prev = self.vertices[len - 2];
            if prev.calc_dist(&self.vertices[len - 1]) {
                break;
            }
            let t = self.vertices[len - 1];
            self.vertices.pop();
            self.modify_last(t);
        }

        if closed {
            while self.vertices.len() > 1 {
                let mut last = self.vertices[self.vertices.len() - 1];
                if last.calc_dist(&self.vertices[0]) {
                    break;
                }
                self.vertices.pop();
            }
        }

        let n = self.vertices.len();
        for i in 0..n {
            let next = if i + 1 < n {
                self.vertices[i + 1]
            } else if closed {
                self.vertices[0]
            } else {
                break;
            };
            self.vertices[i].calc_dist(&next);
        }
        if !closed {
            if let Some(last) = self.vertices.last_mut() {
                last.dist = 0.0;
            }
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Vertex before `idx`, wrapping around.
    #[inline]
    pub fn prev(&self, idx: usize) -> &VertexDist {
        let n = self.vertices.len();
        &self.vertices[(idx + n - 1) % n]
    }

    #[inline]
    pub fn curr(&self, idx: usize) -> &VertexDist {
        &self.vertices[idx]
    }

    /// Vertex after `idx`, wrapping around.
    #[inline]
    pub fn next(&self, idx: usize) -> &VertexDist {
        &self.vertices[(idx + 1) % self.vertices.len()]
    }
}

impl core::ops::Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product_sides() {
        // Point to the left of an eastward line is negative in this convention.
        assert!(cross_product(0.0, 0.0, 1.0, 0.0, 2.0, 1.0) < 0.0);
        assert!(cross_product(0.0, 0.0, 1.0, 0.0, 2.0, -1.0) > 0.0);
        assert_eq!(cross_product(0.0, 0.0, 1.0, 0.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_distances() {
        assert!((calc_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-10);
        assert!((calc_sq_distance(0.0, 0.0, 3.0, 4.0) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_intersection() {
        let (x, y) = calc_intersection(0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0).unwrap();
        assert!((x - 5.0).abs() < 1e-10);
        assert!((y - 5.0).abs() < 1e-10);
        assert!(calc_intersection(0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            PointD::new(0.0, 0.0),
            PointD::new(2.0, 0.0),
            PointD::new(2.0, 2.0),
            PointD::new(0.0, 2.0),
        ];
        assert!((calc_polygon_area(&square) - 4.0).abs() < 1e-10);
        let mut reversed = square;
        reversed.reverse();
        assert!((calc_polygon_area(&reversed) + 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_vertex_sequence_removes_coincident() {
        let mut seq = VertexSequence::new();
        seq.add(VertexDist::new(0.0, 0.0));
        seq.add(VertexDist::new(1.0, 0.0));
        seq.add(VertexDist::new(1.0, 0.0));
        // Lazy check: the duplicate is still there until the next add.
        assert_eq!(seq.size(), 3);
        seq.add(VertexDist::new(2.0, 0.0));
        assert_eq!(seq.size(), 3);
    }

    #[test]
    fn test_vertex_sequence_close_open() {
        let mut seq = VertexSequence::new();
        seq.add(VertexDist::new(0.0, 0.0));
        seq.add(VertexDist::new(3.0, 0.0));
        seq.add(VertexDist::new(3.0, 4.0));
        seq.add(VertexDist::new(3.0, 4.0));
        seq.close(false);
        assert_eq!(seq.size(), 3);
        assert!((seq[0].dist - 3.0).abs() < 1e-10);
        assert!((seq[1].dist - 4.0).abs() < 1e-10);
        assert_eq!(seq[2].dist, 0.0);
    }

    #[test]
    fn test_vertex_sequence_close_closed_drops_duplicate_start() {
        let mut seq = VertexSequence::new();
        seq.add(VertexDist::new(0.0, 0.0));
        seq.add(VertexDist::new(3.0, 0.0));
        seq.add(VertexDist::new(3.0, 4.0));
        seq.add(VertexDist::new(0.0, 0.0));
        seq.close(true);
        assert_eq!(seq.size(), 3);
        assert!((seq[2].dist - 5.0).abs() < 1e-10);
        assert_eq!(seq.prev(0).x, 3.0);
        assert_eq!(seq.next(2).x, 0.0);
    }
}
