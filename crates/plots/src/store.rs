//! Plot persistence: the record shape, the store seam, and an in-memory
//! store with a bucketed spatial index.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::grid_point::GridPoint;
use crate::owner::{PlotOwner, WorldId};
use crate::polygon::{BoundingBox, PlotId, Polygon};
use crate::save::{decode_snapshot, Saveable};

/// One stored plot. Vertices stay in their textual form so a record can be
/// carried around without parsing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub id: PlotId,
    pub owner: Option<PlotOwner>,
    pub world: WorldId,
    pub vertices: String,
    pub centroid: Option<(i64, i64)>,
    pub bounding_box: Option<BoundingBox>,
    pub parent: Option<PlotId>,
    pub depth: u32,
}

/// Where plots live between queries.
pub trait PlotStore {
    /// Records of `world` whose bounding box covers `point`. May include
    /// plots that do not actually contain the point.
    fn candidates_at(&self, world: &WorldId, point: GridPoint) -> Vec<PlotRecord>;

    fn get(&self, id: PlotId) -> Option<PlotRecord>;

    /// Insert or replace the record with the same id.
    fn save(&mut self, record: PlotRecord);

    fn delete(&mut self, id: PlotId) -> Option<PlotRecord>;

    /// A fresh positive id, never handed out before.
    fn allocate_id(&mut self) -> PlotId;
}

/// Bucket edge length in blocks.
pub const BUCKET_SIZE: i64 = 64;

type BucketKey = (WorldId, i64, i64);

#[derive(Resource, Debug, Clone, Default)]
pub struct MemoryPlotStore {
    records: BTreeMap<PlotId, PlotRecord>,
    buckets: HashMap<BucketKey, BTreeSet<PlotId>>,
    last_id: PlotId,
}

impl MemoryPlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlotRecord> {
        self.records.values()
    }

    /// Bucket keys overlapped by `bbox`.
    fn bucket_keys(world: &WorldId, bbox: &BoundingBox) -> Vec<BucketKey> {
        let (bx0, bz0) = (
            bbox.min_x.div_euclid(BUCKET_SIZE),
            bbox.min_z.div_euclid(BUCKET_SIZE),
        );
        let (bx1, bz1) = (
            bbox.max_x.div_euclid(BUCKET_SIZE),
            bbox.max_z.div_euclid(BUCKET_SIZE),
        );
        let mut keys = Vec::with_capacity(((bx1 - bx0 + 1) * (bz1 - bz0 + 1)) as usize);
        for bx in bx0..=bx1 {
            for bz in bz0..=bz1 {
                keys.push((world.clone(), bx, bz));
            }
        }
        keys
    }

    fn index(&mut self, record: &PlotRecord) {
        let Some(bbox) = record.bounding_box else {
            return;
        };
        for key in Self::bucket_keys(&record.world, &bbox) {
            self.buckets.entry(key).or_default().insert(record.id);
        }
    }

    fn unindex(&mut self, record: &PlotRecord) {
        let Some(bbox) = record.bounding_box else {
            return;
        };
        for key in Self::bucket_keys(&record.world, &bbox) {
            if let Some(ids) = self.buckets.get_mut(&key) {
                ids.remove(&record.id);
                if ids.is_empty() {
                    self.buckets.remove(&key);
                }
            }
        }
    }
}

impl PlotStore for MemoryPlotStore {
    fn candidates_at(&self, world: &WorldId, point: GridPoint) -> Vec<PlotRecord> {
        let (x, z) = point.block();
        let key = (
            world.clone(),
            x.div_euclid(BUCKET_SIZE),
            z.div_euclid(BUCKET_SIZE),
        );
        let Some(ids) = self.buckets.get(&key) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| r.bounding_box.is_some_and(|b| b.contains(point)))
            .cloned()
            .collect()
    }

    fn get(&self, id: PlotId) -> Option<PlotRecord> {
        self.records.get(&id).cloned()
    }

    /// A record without a bounding box gets one (and a centroid) derived
    /// from its vertices before it is indexed.
    fn save(&mut self, mut record: PlotRecord) {
        if record.bounding_box.is_none() {
            match Polygon::from_record(&record) {
                Ok(polygon) => {
                    let derived = polygon.to_record();
                    record.bounding_box = derived.bounding_box;
                    record.centroid = record.centroid.or(derived.centroid);
                }
                Err(e) => warn!("plot {}: stored unindexed: {}", record.id, e),
            }
        }
        if let Some(previous) = self.records.remove(&record.id) {
            self.unindex(&previous);
        }
        self.last_id = self.last_id.max(record.id);
        self.index(&record);
        self.records.insert(record.id, record);
    }

    fn delete(&mut self, id: PlotId) -> Option<PlotRecord> {
        let record = self.records.remove(&id)?;
        self.unindex(&record);
        Some(record)
    }

    fn allocate_id(&mut self) -> PlotId {
        self.last_id = self.last_id.max(0) + 1;
        self.last_id
    }
}

// =============================================================================
// Saveable
// =============================================================================

#[derive(Encode, Decode, Default)]
struct PlotStoreSave {
    last_id: i64,
    records: Vec<PlotRecordSave>,
}

#[derive(Encode, Decode)]
struct PlotRecordSave {
    id: i64,
    owner: Option<String>,
    world: String,
    vertices: String,
    parent: Option<i64>,
    depth: u32,
}

impl Saveable for MemoryPlotStore {
    const SAVE_KEY: &'static str = "plot_store";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.records.is_empty() {
            return None;
        }
        let save = PlotStoreSave {
            last_id: self.last_id,
            records: self
                .records
                .values()
                .map(|r| PlotRecordSave {
                    id: r.id,
                    owner: r.owner.as_ref().map(PlotOwner::encode),
                    world: r.world.0.clone(),
                    vertices: r.vertices.clone(),
                    parent: r.parent,
                    depth: r.depth,
                })
                .collect(),
        };
        Some(bitcode::encode(&save))
    }

    /// Centroid and bounding box are derived again from the vertices.
    /// Records whose vertices no longer parse are dropped with a warning.
    fn load_from_bytes(bytes: &[u8]) -> Self {
        let save: PlotStoreSave = decode_snapshot(Self::SAVE_KEY, bytes);
        let mut store = MemoryPlotStore::default();
        for saved in save.records {
            let owner = saved.owner.as_deref().and_then(|text| {
                let parsed = PlotOwner::parse(text);
                if parsed.is_none() {
                    warn!("plot {}: unreadable owner {:?}, left vacant", saved.id, text);
                }
                parsed
            });
            let bare = PlotRecord {
                id: saved.id,
                owner,
                world: WorldId(saved.world),
                vertices: saved.vertices,
                centroid: None,
                bounding_box: None,
                parent: saved.parent,
                depth: saved.depth,
            };
            match Polygon::from_record(&bare) {
                Ok(polygon) => store.save(polygon.to_record()),
                Err(e) => warn!("plot {}: dropped on load: {}", saved.id, e),
            }
        }
        store.last_id = store.last_id.max(save.last_id);
        store
    }
}
