use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid_point::GridPoint;

/// An ordered pair of endpoints.
///
/// Equality is order-sensitive: `a -> b` and `b -> a` are different
/// segments (use [`Segment::reversed`] to compare undirected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub p1: GridPoint,
    pub p2: GridPoint,
}

impl Segment {
    pub const fn new(p1: GridPoint, p2: GridPoint) -> Self {
        Self { p1, p2 }
    }

    pub fn from_blocks(x1: i64, z1: i64, x2: i64, z2: i64) -> Self {
        Self::new(GridPoint::from_block(x1, z1), GridPoint::from_block(x2, z2))
    }

    pub fn reversed(self) -> Self {
        Self::new(self.p2, self.p1)
    }

    pub fn delta(self) -> (f64, f64) {
        (self.p2.x - self.p1.x, self.p2.z - self.p1.z)
    }

    /// Whether the segment is axis-parallel or exactly 45 degrees.
    ///
    /// The slope ratio (taken as the smaller over the larger axis delta) must
    /// be an integer, which leaves `0` and `1`. A zero-length segment is not
    /// aligned.
    pub fn is_aligned(self) -> bool {
        let (dx, dz) = self.delta();
        if dx == 0.0 && dz == 0.0 {
            return false;
        }
        let ratio = if dx == 0.0 {
            (dx / dz).abs()
        } else {
            let r = (dz / dx).abs();
            if r > 1.0 {
                1.0 / r
            } else {
                r
            }
        };
        ratio.fract() == 0.0
    }

    /// Intersection point of two segments, if any.
    ///
    /// Uses the line-line determinant. Parallel and colinear segments report
    /// `None`. The candidate point must lie within the inclusive bounding
    /// ranges of both segments.
    pub fn intersection(&self, other: &Segment) -> Option<GridPoint> {
        let (x1, z1, x2, z2) = (self.p1.x, self.p1.z, self.p2.x, self.p2.z);
        let (x3, z3, x4, z4) = (other.p1.x, other.p1.z, other.p2.x, other.p2.z);

        let d = (x1 - x2) * (z3 - z4) - (z1 - z2) * (x3 - x4);
        if d == 0.0 {
            return None;
        }

        let a = x1 * z2 - z1 * x2;
        let b = x3 * z4 - z3 * x4;
        let xi = ((x3 - x4) * a - (x1 - x2) * b) / d;
        let zi = ((z3 - z4) * a - (z1 - z2) * b) / d;

        let within = |lo: f64, hi: f64, v: f64| v >= lo.min(hi) && v <= lo.max(hi);
        if !within(x1, x2, xi) || !within(z1, z2, zi) {
            return None;
        }
        if !within(x3, x4, xi) || !within(z3, z4, zi) {
            return None;
        }
        Some(GridPoint::new(xi, zi))
    }

    /// True when the point lies on this segment.
    ///
    /// An endpoint returns `edge_allowed`. Otherwise the point must be
    /// colinear with the segment and strictly between its endpoints.
    pub fn contains(&self, point: GridPoint, edge_allowed: bool) -> bool {
        if self.touches_at(point) {
            return edge_allowed;
        }

        let (dist_x, dist_z) = self.delta();
        let (dist_px, dist_pz) = (point.x - self.p1.x, point.z - self.p1.z);

        if dist_x == 0.0 && dist_z == 0.0 {
            return false;
        }
        if dist_x == 0.0 {
            return dist_px == 0.0 && strictly_towards(dist_pz, dist_z);
        }
        if dist_z == 0.0 {
            return dist_pz == 0.0 && strictly_towards(dist_px, dist_x);
        }
        if dist_px == 0.0 || dist_pz == 0.0 {
            return false;
        }
        if dist_px / dist_pz != dist_x / dist_z {
            return false;
        }
        strictly_towards(dist_px, dist_x) && strictly_towards(dist_pz, dist_z)
    }

    /// The point at fraction `t` of the way from `p1` to `p2`.
    pub fn point_at(&self, t: f64) -> GridPoint {
        let (dx, dz) = self.delta();
        GridPoint::new(self.p1.x + dx * t, self.p1.z + dz * t)
    }

    /// Fraction along the segment of a point assumed to lie on its line.
    /// `None` for a zero-length segment.
    pub fn param_of(&self, point: GridPoint) -> Option<f64> {
        let (dx, dz) = self.delta();
        let len2 = dx * dx + dz * dz;
        if len2 == 0.0 {
            return None;
        }
        Some(((point.x - self.p1.x) * dx + (point.z - self.p1.z) * dz) / len2)
    }

    /// Whether either endpoint coincides exactly with `point`.
    pub fn touches_at(&self, point: GridPoint) -> bool {
        self.p1.coincides(point) || self.p2.coincides(point)
    }

    /// A proper crossing: the segments intersect at a point that is not
    /// exactly an endpoint of either one.
    pub fn crosses(&self, other: &Segment) -> bool {
        match self.intersection(other) {
            Some(at) => !self.touches_at(at) && !other.touches_at(at),
            None => false,
        }
    }

    /// Colinear overlap of positive length.
    ///
    /// Two segments overlap when one holds an endpoint of the other strictly
    /// inside it, or when they span the same two endpoints. Segments that
    /// only share one endpoint do not overlap.
    pub fn overlaps(&self, other: &Segment) -> bool {
        if *self == *other || *self == other.reversed() {
            return self.p1 != self.p2;
        }
        other.contains(self.p1, false)
            || other.contains(self.p2, false)
            || self.contains(other.p1, false)
            || self.contains(other.p2, false)
    }
}

/// `offset` points the same way as `span` and is strictly shorter.
#[inline]
fn strictly_towards(offset: f64, span: f64) -> bool {
    offset.signum() == span.signum() && offset.abs() < span.abs()
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.p1, self.p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: i64, z1: i64, x2: i64, z2: i64) -> Segment {
        Segment::from_blocks(x1, z1, x2, z2)
    }

    #[test]
    fn test_alignment_axis_and_diagonal() {
        assert!(seg(0, 0, 0, 10).is_aligned());
        assert!(seg(0, 0, -7, 0).is_aligned());
        assert!(seg(0, 0, 5, 5).is_aligned());
        assert!(seg(3, 3, -2, 8).is_aligned());
    }

    #[test]
    fn test_alignment_rejects_other_slopes() {
        assert!(!seg(0, 0, 3, 5).is_aligned());
        assert!(!seg(0, 0, 10, 1).is_aligned());
        assert!(!seg(4, 4, 4, 4).is_aligned());
    }

    #[test]
    fn test_intersection_of_crossing_diagonals() {
        let a = seg(0, 0, 10, 10);
        let b = seg(0, 10, 10, 0);
        let at = a.intersection(&b).expect("diagonals cross");
        assert!(at.coincides(GridPoint::new(5.0, 5.0)));
        assert!(a.crosses(&b));
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        assert_eq!(seg(0, 0, 10, 0).intersection(&seg(0, 5, 10, 5)), None);
        assert_eq!(seg(0, 0, 10, 0).intersection(&seg(2, 0, 8, 0)), None);
    }

    #[test]
    fn test_intersection_outside_bounds() {
        // The supporting lines meet at (5, 0) but the second segment stops short.
        assert_eq!(seg(0, 0, 10, 0).intersection(&seg(5, 3, 5, 8)), None);
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        let a = seg(0, 0, 10, 0);
        let b = seg(10, 0, 10, 10);
        assert!(a.intersection(&b).is_some());
        assert!(!a.crosses(&b));
    }

    #[test]
    fn test_t_junction_is_not_a_crossing() {
        // The second segment ends exactly on the first.
        let a = seg(0, 0, 10, 0);
        let b = seg(5, 0, 5, 6);
        assert!(!a.crosses(&b));
    }

    #[test]
    fn test_contains_endpoint_respects_edge_flag() {
        let s = seg(0, 0, 10, 0);
        assert!(s.contains(GridPoint::from_block(0, 0), true));
        assert!(!s.contains(GridPoint::from_block(10, 0), false));
    }

    #[test]
    fn test_point_rounding_onto_endpoint_is_not_on_segment() {
        let s = seg(0, 0, 10, 0);
        // Rounds to (0, 0) but is neither that endpoint nor on the line.
        assert!(!s.contains(GridPoint::new(-0.25, 0.25), true));
        assert!(!s.contains(GridPoint::new(10.25, -0.25), true));
        assert!(s.contains(GridPoint::new(9.5, 0.0), false));
    }

    #[test]
    fn test_point_at_and_param_of() {
        let s = seg(2, 2, 2, 10);
        assert!(s.point_at(0.5).coincides(GridPoint::from_block(2, 6)));
        assert_eq!(s.param_of(GridPoint::from_block(2, 4)), Some(0.25));
        assert_eq!(seg(3, 3, 3, 3).param_of(GridPoint::from_block(3, 3)), None);
    }

    #[test]
    fn test_contains_interior_points() {
        assert!(seg(0, 0, 10, 0).contains(GridPoint::from_block(4, 0), false));
        assert!(seg(0, 0, 0, -10).contains(GridPoint::from_block(0, -9), false));
        assert!(seg(0, 0, 6, 6).contains(GridPoint::from_block(2, 2), false));
        assert!(seg(6, 0, 0, 6).contains(GridPoint::from_block(3, 3), false));
    }

    #[test]
    fn test_contains_rejects_off_line_and_beyond() {
        let s = seg(0, 0, 10, 0);
        assert!(!s.contains(GridPoint::from_block(4, 1), true));
        assert!(!s.contains(GridPoint::from_block(11, 0), true));
        assert!(!s.contains(GridPoint::from_block(-1, 0), true));
        assert!(!seg(0, 0, 6, 6).contains(GridPoint::from_block(2, 3), true));
        assert!(!seg(0, 0, 6, 6).contains(GridPoint::from_block(7, 7), true));
    }

    #[test]
    fn test_overlap_cases() {
        let a = seg(0, 0, 0, 10);
        assert!(a.overlaps(&seg(0, 5, 0, 15)));
        assert!(a.overlaps(&seg(0, 10, 0, 3)));
        assert!(a.overlaps(&a.reversed()));
        assert!(!a.overlaps(&seg(0, 10, 0, 20)));
        assert!(!a.overlaps(&seg(1, 0, 1, 10)));
    }

    #[test]
    fn test_equality_is_directional() {
        let a = seg(0, 0, 5, 5);
        assert_ne!(a, a.reversed());
        assert_eq!(a, a.reversed().reversed());
    }

    #[test]
    fn test_display() {
        assert_eq!(seg(1, 2, 3, 4).to_string(), "[(1, 2)|(3, 4)]");
    }
}
