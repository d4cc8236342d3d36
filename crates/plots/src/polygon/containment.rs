use super::Polygon;
use crate::grid_point::GridPoint;
use crate::segment::Segment;

impl Polygon {
    /// Point-in-polygon test. Border points count as inside and the
    /// wilderness contains everything.
    ///
    /// The polygon is fanned into triangles from the first vertex. A point
    /// strictly inside a triangle counts 1, a point on a fan diagonal
    /// counts half from each of the two triangles sharing it (signed by
    /// which side it sits on). The point is inside when the total is an
    /// odd integer, which holds for concave shapes too.
    pub fn contains_point(&self, point: GridPoint) -> bool {
        if self.is_wilderness() {
            return true;
        }
        match self.bounding_box() {
            Some(bbox) if bbox.contains(point) => {}
            _ => return false,
        }

        if self
            .border_lines()
            .iter()
            .any(|edge| edge.contains(point, true))
        {
            return true;
        }
        // A single vertex has no border lines but still covers its own block.
        if self.vertices.len() == 1 {
            return self.vertices[0] == point;
        }

        let v = &self.vertices;
        let origin = v[0];
        let mut counter = 0.0_f64;
        for i in 1..v.len().saturating_sub(1) {
            let (a, b) = (v[i], v[i + 1]);
            let s1 = sign(point.cross(origin, a));
            let s2 = sign(point.cross(a, b));
            let s3 = sign(point.cross(b, origin));

            if s1 == 0 && s2 == 0 && s3 == 0 {
                continue;
            }
            if s1 == s2 && s2 == s3 {
                counter += 1.0;
            } else if s1 <= 0 && s2 <= 0 && s3 <= 0 {
                counter += 0.5;
            } else if s1 >= 0 && s2 >= 0 && s3 >= 0 {
                counter -= 0.5;
            }
        }

        counter.fract() == 0.0 && (counter as i64).rem_euclid(2) == 1
    }

    /// Whether a segment lies wholly inside the polygon. The wilderness
    /// contains every segment.
    ///
    /// No border line may cross it and both endpoints must be contained.
    /// The border can still meet the segment at vertices only, as across
    /// the mouth of a concave notch, so the segment is split wherever the
    /// border touches it and the midpoint of every piece must be contained
    /// too.
    pub fn contains_segment(&self, segment: &Segment) -> bool {
        if self.is_wilderness() {
            return true;
        }
        let lines = self.border_lines();
        if lines.iter().any(|line| line.crosses(segment)) {
            return false;
        }
        if !self.contains_point(segment.p1) || !self.contains_point(segment.p2) {
            return false;
        }

        let mut cuts = vec![0.0, 1.0];
        cuts.extend(
            lines
                .iter()
                .filter_map(|line| line.intersection(segment))
                .chain(
                    self.vertices
                        .iter()
                        .copied()
                        .filter(|v| segment.contains(*v, false)),
                )
                .filter_map(|at| segment.param_of(at))
                .filter(|t| *t > 0.0 && *t < 1.0),
        );
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();

        cuts.windows(2)
            .all(|w| self.contains_point(segment.point_at((w[0] + w[1]) / 2.0)))
    }
}

/// Sign of `v` as -1, 0 or 1. Zero stays zero, unlike `f64::signum`.
#[inline]
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
