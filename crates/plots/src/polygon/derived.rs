use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Polygon;
use crate::grid_point::{snap, GridPoint};
use crate::segment::Segment;

/// Inclusive block-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_z: i64,
    pub max_x: i64,
    pub max_z: i64,
}

impl BoundingBox {
    pub fn from_points(points: &[GridPoint]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let (x, z) = first.block();
        let mut bbox = BoundingBox {
            min_x: x,
            min_z: z,
            max_x: x,
            max_z: z,
        };
        for p in rest {
            let (x, z) = p.block();
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_z = bbox.min_z.min(z);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_z = bbox.max_z.max(z);
        }
        Some(bbox)
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        point.x >= self.min_x as f64
            && point.x <= self.max_x as f64
            && point.z >= self.min_z as f64
            && point.z <= self.max_z as f64
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> i64 {
        self.max_z - self.min_z
    }
}

impl Polygon {
    /// Area-weighted centroid, rounded to the block grid.
    ///
    /// A single vertex is its own centroid and two vertices give their
    /// midpoint. A degenerate (zero-area) shape falls back to the mean of
    /// its vertices.
    pub fn centroid(&self) -> Option<GridPoint> {
        *self
            .cache
            .centroid
            .get_or_init(|| compute_centroid(&self.vertices))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        *self
            .cache
            .bounding_box
            .get_or_init(|| BoundingBox::from_points(&self.vertices))
    }

    /// Sum over border lines of `(x2 - x1) * (z2 + z1)`.
    pub fn winding_sum(&self) -> f64 {
        self.border_lines()
            .iter()
            .map(|l| (l.p2.x - l.p1.x) * (l.p2.z + l.p1.z))
            .sum()
    }

    pub fn is_clockwise(&self) -> bool {
        self.winding_sum() > 0.0
    }

    /// Unit-length edges tracing the outside of every border block.
    ///
    /// Hosts draw these to show the claim outline. Each block along a
    /// border line contributes the face that points away from the
    /// interior, which depends on the walking direction and the winding.
    pub fn border_raster(&self) -> &HashSet<Segment> {
        self.cache
            .raster
            .get_or_init(|| rasterize_border(&self.border_lines(), self.is_clockwise()))
    }
}

fn compute_centroid(vertices: &[GridPoint]) -> Option<GridPoint> {
    match vertices {
        [] => None,
        [only] => Some(only.rounded()),
        [a, b] => Some(a.midpoint(*b).rounded()),
        _ => {
            let n = vertices.len();
            let mut area = 0.0;
            let mut cx = 0.0;
            let mut cz = 0.0;
            for i in 0..n {
                let (p, q) = (vertices[i], vertices[(i + 1) % n]);
                let cross = p.x * q.z - q.x * p.z;
                area += cross;
                cx += (p.x + q.x) * cross;
                cz += (p.z + q.z) * cross;
            }
            area *= 0.5;
            if area == 0.0 {
                let (sx, sz) = vertices
                    .iter()
                    .fold((0.0, 0.0), |(sx, sz), v| (sx + v.x, sz + v.z));
                return Some(GridPoint::new(sx / n as f64, sz / n as f64).rounded());
            }
            Some(GridPoint::from_block(
                snap(cx / (6.0 * area)),
                snap(cz / (6.0 * area)),
            ))
        }
    }
}

fn rasterize_border(lines: &[Segment], clockwise: bool) -> HashSet<Segment> {
    let mut raster = HashSet::new();
    for line in lines {
        let end = line.p2.block();
        let mut current = line.p1.block();
        let mut first_step = true;
        while current != end {
            let dir = ((end.0 - current.0).signum(), (end.1 - current.1).signum());
            if first_step {
                first_step = false;
            } else {
                current = (current.0 + dir.0, current.1 + dir.1);
            }
            push_block_face(&mut raster, current, dir, clockwise);
        }
    }
    raster
}

fn push_block_face(
    raster: &mut HashSet<Segment>,
    (x, z): (i64, i64),
    (dx, dz): (i64, i64),
    clockwise: bool,
) {
    let mut face = |x1, z1, x2, z2| {
        raster.insert(Segment::from_blocks(x1, z1, x2, z2));
    };
    if clockwise {
        if dx == -1 {
            face(x + 1, z, x, z);
        }
        if dz == -1 {
            face(x + 1, z + 1, x + 1, z);
        }
        if dx == 1 {
            face(x, z + 1, x + 1, z + 1);
        }
        if dz == 1 {
            face(x, z, x, z + 1);
        }
    } else {
        if dx == -1 {
            face(x, z + 1, x + 1, z + 1);
        }
        if dz == -1 {
            face(x, z, x, z + 1);
        }
        if dx == 1 {
            face(x + 1, z, x, z);
        }
        if dz == 1 {
            face(x + 1, z + 1, x + 1, z);
        }
    }
}
