use bevy::prelude::*;

use super::Polygon;
use crate::error::ClaimError;
use crate::grid_point::GridPoint;
use crate::hierarchy::PlotLookup;
use crate::segment::Segment;

impl Polygon {
    /// Append a vertex, enforcing the edge rules against the current last
    /// vertex.
    ///
    /// The first vertex is always accepted. Later vertices need an aligned
    /// edge that stays inside the parent and does not cross (or run along)
    /// any existing border. A rejected vertex leaves the polygon unchanged.
    pub fn add_point<L: PlotLookup + ?Sized>(
        &mut self,
        vertex: GridPoint,
        ancestry: &L,
    ) -> Result<(), ClaimError> {
        let Some(&last) = self.vertices.last() else {
            self.vertices.push(vertex);
            self.invalidate();
            return Ok(());
        };

        let parent = self.resolve_parent(ancestry)?;
        if !edge_is_aligned(vertex, last, parent) {
            return Err(ClaimError::BadAlignment);
        }
        if self.intersects_border(&Segment::new(vertex, last), parent) {
            return Err(ClaimError::IntersectsBorder);
        }

        self.vertices.push(vertex);
        self.invalidate();
        Ok(())
    }

    /// Whether the edge `a -> b` would be legal in this polygon.
    pub fn check_alignment<L: PlotLookup + ?Sized>(
        &self,
        a: GridPoint,
        b: GridPoint,
        ancestry: &L,
    ) -> bool {
        match self.resolve_parent(ancestry) {
            Ok(parent) => edge_is_aligned(a, b, parent),
            Err(_) => false,
        }
    }

    /// True once the closing edge (last vertex back to the first) is legal.
    pub fn is_complete<L: PlotLookup + ?Sized>(&self, ancestry: &L) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(&first), Some(&last)) => self.check_alignment(first, last, ancestry),
            _ => false,
        }
    }

    /// Whole-shape validation before a polygon is committed.
    ///
    /// No two border lines of the polygon (or of the polygon against its
    /// parent) may cross, no two of its own border lines may overlap, and
    /// every border line must sit inside the parent.
    pub fn is_valid_shape<L: PlotLookup + ?Sized>(&self, ancestry: &L) -> bool {
        let parent = match self.resolve_parent(ancestry) {
            Ok(parent) => parent,
            Err(_) => {
                warn!(
                    "plot {}: parent {:?} missing from ancestry, shape rejected",
                    self.id, self.parent
                );
                return false;
            }
        };

        let own = self.border_lines();
        for (i, a) in own.iter().enumerate() {
            if own[i + 1..].iter().any(|b| a.overlaps(b)) {
                return false;
            }
        }

        if let Some(parent) = parent {
            if !own.iter().all(|line| parent.contains_segment(line)) {
                return false;
            }
        }

        let mut all = own;
        if let Some(parent) = parent {
            all.extend(parent.border_lines());
        }
        for line in &all {
            if all.iter().any(|other| other != line && other.crosses(line)) {
                return false;
            }
        }
        true
    }

    /// Whether `edge` crosses any own or parent border line, or runs along
    /// one of the own edges other than the provisional closing edge.
    pub(crate) fn intersects_border(&self, edge: &Segment, parent: Option<&Polygon>) -> bool {
        let own = self.border_lines();
        let closing = own.last().copied();

        for line in &own {
            if line == edge {
                continue;
            }
            if line.crosses(edge) {
                return true;
            }
            if Some(*line) != closing && line.overlaps(edge) {
                return true;
            }
        }

        if let Some(parent) = parent {
            return parent
                .border_lines()
                .iter()
                .any(|line| line != edge && line.crosses(edge));
        }
        false
    }
}

/// Aligned on the grid and, when a parent exists, inside it.
fn edge_is_aligned(a: GridPoint, b: GridPoint, parent: Option<&Polygon>) -> bool {
    let segment = Segment::new(a, b);
    if !segment.is_aligned() {
        return false;
    }
    parent.is_none_or(|p| p.contains_segment(&segment))
}
