//! Plot polygons: vertex lists on the block grid with lazily derived
//! geometry (centroid, bounding box, rasterized border).
//!
//! Construction rules live in `construction`, point and segment tests in
//! `containment`, and the derived values in `derived`.

mod construction;
mod containment;
mod derived;


pub use derived::BoundingBox;

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::ClaimError;
use crate::grid_point::GridPoint;
use crate::hierarchy::PlotLookup;
use crate::owner::{PlotOwner, WorldId};
use crate::segment::Segment;
use crate::store::PlotRecord;
use crate::vertex_codec::{parse_vertices, serialize_vertices, VertexParseError};

pub type PlotId = i64;

/// Reserved id of the per-world wilderness. Every real plot id is positive.
pub const WILDERNESS_ID: PlotId = -1;

#[derive(Debug, Clone, Default)]
struct DerivedCache {
    centroid: OnceLock<Option<GridPoint>>,
    bounding_box: OnceLock<Option<BoundingBox>>,
    raster: OnceLock<HashSet<Segment>>,
}

/// A plot polygon.
///
/// The parent is held as an id and resolved through a [`PlotLookup`], so a
/// polygon never owns its ancestors. Derived geometry is computed on first
/// use and dropped whenever the vertex list changes.
#[derive(Debug, Clone)]
pub struct Polygon {
    id: PlotId,
    owner: Option<PlotOwner>,
    world: WorldId,
    parent: Option<PlotId>,
    depth: u32,
    vertices: Vec<GridPoint>,
    cache: DerivedCache,
}

impl Polygon {
    /// The unbounded root of `world`, owned by everyone.
    pub fn wilderness(world: WorldId) -> Self {
        Self {
            id: WILDERNESS_ID,
            owner: Some(PlotOwner::Everyone),
            world,
            parent: None,
            depth: 0,
            vertices: Vec::new(),
            cache: DerivedCache::default(),
        }
    }

    /// An empty polygon nested directly inside `parent`.
    pub fn new_child(id: PlotId, owner: Option<PlotOwner>, parent: &Polygon) -> Self {
        Self {
            id,
            owner,
            world: parent.world.clone(),
            parent: Some(parent.id),
            depth: parent.depth + 1,
            vertices: Vec::new(),
            cache: DerivedCache::default(),
        }
    }

    /// A polygon with already validated vertices and no parent link.
    pub fn with_vertices(
        id: PlotId,
        owner: Option<PlotOwner>,
        world: WorldId,
        vertices: Vec<GridPoint>,
        depth: u32,
    ) -> Self {
        Self {
            id,
            owner,
            world,
            parent: None,
            depth,
            vertices,
            cache: DerivedCache::default(),
        }
    }

    /// Materialize a stored record. Stored centroid and bounding box, when
    /// present, seed the derived cache instead of being recomputed.
    pub fn from_record(record: &PlotRecord) -> Result<Self, VertexParseError> {
        let vertices = parse_vertices(&record.vertices)?;
        let mut polygon = Self::with_vertices(
            record.id,
            record.owner.clone(),
            record.world.clone(),
            vertices,
            record.depth,
        );
        polygon.parent = record.parent;
        if let Some((x, z)) = record.centroid {
            polygon.cache.centroid = OnceLock::from(Some(GridPoint::from_block(x, z)));
        }
        if let Some(bbox) = record.bounding_box {
            polygon.cache.bounding_box = OnceLock::from(Some(bbox));
        }
        Ok(polygon)
    }

    pub fn to_record(&self) -> PlotRecord {
        PlotRecord {
            id: self.id,
            owner: self.owner.clone(),
            world: self.world.clone(),
            vertices: serialize_vertices(&self.vertices),
            centroid: self.centroid().map(GridPoint::block),
            bounding_box: self.bounding_box(),
            parent: self.parent,
            depth: self.depth,
        }
    }

    pub fn id(&self) -> PlotId {
        self.id
    }

    pub fn is_wilderness(&self) -> bool {
        self.id < 0
    }

    pub fn owner(&self) -> Option<&PlotOwner> {
        self.owner.as_ref()
    }

    /// Reassign the owner. Geometry is untouched.
    pub fn set_owner(&mut self, owner: Option<PlotOwner>) {
        self.owner = owner;
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn parent(&self) -> Option<PlotId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<PlotId>) {
        self.parent = parent;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn vertices(&self) -> &[GridPoint] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Consecutive vertex pairs plus the closing edge back to the first
    /// vertex. Empty with fewer than two vertices.
    pub fn border_lines(&self) -> Vec<Segment> {
        let n = self.vertices.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    /// The parent polygon through `ancestry`.
    ///
    /// `Ok(None)` for a root. `Err` when a parent id is set but `ancestry`
    /// does not know it, which callers must not treat as "no constraint".
    pub(crate) fn resolve_parent<'a, L: PlotLookup + ?Sized>(
        &self,
        ancestry: &'a L,
    ) -> Result<Option<&'a Polygon>, ClaimError> {
        match self.parent {
            None => Ok(None),
            Some(id) => ancestry
                .plot(id)
                .map(Some)
                .ok_or(ClaimError::NotFound),
        }
    }

    fn invalidate(&mut self) {
        self.cache = DerivedCache::default();
    }
}
