use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Snap a coordinate to the block grid. Halves round towards positive
/// infinity, so `-2.5` snaps to `-2` and `2.5` snaps to `3`.
#[inline]
pub fn snap(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// A position on the horizontal (x, z) block plane.
///
/// Coordinates are kept as `f64` so intersection arithmetic can produce
/// fractional positions, but identity (`Eq`, `Hash`, `Ord`) always goes
/// through the snapped block coordinates. Two points that differ only by
/// floating noise are the same point and hash to the same bucket.
///
/// Use [`GridPoint::coincides`] when an exact comparison is needed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub z: f64,
}

impl GridPoint {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Point at the origin corner of block `(x, z)`.
    pub fn from_block(x: i64, z: i64) -> Self {
        Self::new(x as f64, z as f64)
    }

    /// Snapped block coordinates.
    #[inline]
    pub fn block(self) -> (i64, i64) {
        (snap(self.x), snap(self.z))
    }

    pub fn rounded(self) -> Self {
        let (x, z) = self.block();
        Self::from_block(x, z)
    }

    /// Exact (unsnapped) coordinate equality.
    #[inline]
    pub fn coincides(self, other: GridPoint) -> bool {
        self.x == other.x && self.z == other.z
    }

    pub fn offset(self, dx: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    pub fn midpoint(self, other: GridPoint) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.z + other.z) / 2.0)
    }

    /// Cross product of `(a - self) x (b - self)`.
    ///
    /// Positive when `self -> a -> b` turns one way, negative the other, zero
    /// when the three points are colinear.
    #[inline]
    pub fn cross(self, a: GridPoint, b: GridPoint) -> f64 {
        (a.x - self.x) * (b.z - self.z) - (a.z - self.z) * (b.x - self.x)
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.block() == other.block()
    }
}

impl Eq for GridPoint {}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.block().hash(state);
    }
}

impl Ord for GridPoint {
    /// Orders by x, then z, on snapped coordinates.
    fn cmp(&self, other: &Self) -> Ordering {
        self.block().cmp(&other.block())
    }
}

impl PartialOrd for GridPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i64, i64)> for GridPoint {
    fn from((x, z): (i64, i64)) -> Self {
        Self::from_block(x, z)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, z) = self.block();
        write!(f, "({x}, {z})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_snap_rounds_half_up() {
        assert_eq!(snap(2.5), 3);
        assert_eq!(snap(-2.5), -2);
        assert_eq!(snap(4.999_999_9), 5);
        assert_eq!(snap(-0.4), 0);
    }

    #[test]
    fn test_equality_uses_snapped_coordinates() {
        let a = GridPoint::new(3.0, 7.0);
        let b = GridPoint::new(3.000_000_1, 6.999_999_9);
        assert_eq!(a, b);
        assert!(!a.coincides(b));
        assert_ne!(a, GridPoint::new(3.0, 8.0));
    }

    #[test]
    fn test_hash_stable_under_floating_noise() {
        let mut set = HashSet::new();
        set.insert(GridPoint::new(10.0, -4.0));
        set.insert(GridPoint::new(10.000_000_2, -3.999_999_8));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ordering_x_then_z() {
        let mut points = vec![
            GridPoint::from_block(2, 1),
            GridPoint::from_block(1, 5),
            GridPoint::from_block(1, -3),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![
                GridPoint::from_block(1, -3),
                GridPoint::from_block(1, 5),
                GridPoint::from_block(2, 1),
            ]
        );
    }

    #[test]
    fn test_cross_sign() {
        let origin = GridPoint::from_block(0, 0);
        let a = GridPoint::from_block(10, 0);
        let b = GridPoint::from_block(0, 10);
        assert!(origin.cross(a, b) > 0.0);
        assert!(origin.cross(b, a) < 0.0);
        assert_eq!(origin.cross(a, GridPoint::from_block(20, 0)), 0.0);
    }

    #[test]
    fn test_display_uses_block_coordinates() {
        assert_eq!(GridPoint::new(4.2, -1.0).to_string(), "(4, -1)");
    }
}
