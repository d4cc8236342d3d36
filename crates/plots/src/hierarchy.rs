//! Plot nesting: id-keyed arenas for parent lookup and the resolver that
//! turns stored records at a point into a linked ancestor chain.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::grid_point::GridPoint;
use crate::owner::WorldId;
use crate::polygon::{PlotId, Polygon, WILDERNESS_ID};
use crate::store::PlotRecord;

/// Default bound on how many parent links are followed before giving up.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 100;

/// Resolves parent ids to polygons.
pub trait PlotLookup {
    fn plot(&self, id: PlotId) -> Option<&Polygon>;
}

/// Lookup for polygons that have no ancestors at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAncestry;

impl PlotLookup for NoAncestry {
    fn plot(&self, _id: PlotId) -> Option<&Polygon> {
        None
    }
}

/// Polygons keyed by id. Owns every node of a resolved hierarchy so that
/// children can refer to parents by id alone.
#[derive(Debug, Clone, Default)]
pub struct PlotArena {
    plots: HashMap<PlotId, Polygon>,
}

impl PlotArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a polygon, replacing any with the same id.
    pub fn insert(&mut self, polygon: Polygon) -> PlotId {
        let id = polygon.id();
        self.plots.insert(id, polygon);
        id
    }

    pub fn get(&self, id: PlotId) -> Option<&Polygon> {
        self.plots.get(&id)
    }

    pub fn get_mut(&mut self, id: PlotId) -> Option<&mut Polygon> {
        self.plots.get_mut(&id)
    }

    pub fn remove(&mut self, id: PlotId) -> Option<Polygon> {
        self.plots.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Ancestors of `plot`, nearest first. Stops at a missing link or after
    /// `max_depth` steps.
    pub fn ancestors_of<'a>(&'a self, plot: &Polygon, max_depth: usize) -> Vec<&'a Polygon> {
        let mut chain = Vec::new();
        let mut next = plot.parent();
        while let Some(id) = next {
            if chain.len() >= max_depth {
                warn!(
                    "plot {}: ancestor chain exceeds {} links, truncated",
                    plot.id(),
                    max_depth
                );
                break;
            }
            let Some(parent) = self.get(id) else {
                break;
            };
            chain.push(parent);
            next = parent.parent();
        }
        chain
    }
}

impl PlotLookup for PlotArena {
    fn plot(&self, id: PlotId) -> Option<&Polygon> {
        self.get(id)
    }
}

/// Innermost plot at a queried point, with its ancestors held in an arena.
#[derive(Debug, Clone)]
pub struct ResolvedPlot {
    plot: Polygon,
    ancestry: PlotArena,
    max_chain_depth: usize,
}

impl ResolvedPlot {
    pub fn plot(&self) -> &Polygon {
        &self.plot
    }

    pub fn ancestry(&self) -> &PlotArena {
        &self.ancestry
    }

    /// Ancestors of the innermost plot, nearest first.
    pub fn ancestors(&self) -> Vec<&Polygon> {
        self.ancestry.ancestors_of(&self.plot, self.max_chain_depth)
    }

    /// The innermost plot followed by its ancestors.
    pub fn chain(&self) -> Vec<&Polygon> {
        let mut chain = vec![&self.plot];
        chain.extend(self.ancestors());
        chain
    }

    pub fn into_parts(self) -> (Polygon, PlotArena) {
        (self.plot, self.ancestry)
    }
}

/// Finds the deepest plot covering a point and links its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct PlotHierarchyResolver {
    pub max_chain_depth: usize,
}

impl Default for PlotHierarchyResolver {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl PlotHierarchyResolver {
    pub fn new(max_chain_depth: usize) -> Self {
        Self { max_chain_depth }
    }

    /// Resolve the plot at `point` from the store's candidate records.
    ///
    /// Candidates that fail to parse, belong to another world, claim depth
    /// 0, or do not contain the point are skipped. The survivors are
    /// ordered by depth and each one's parent is set to the survivor one
    /// level up (the wilderness for depth 1). A gap in the depths leaves
    /// the deeper plot without a parent. With no survivors the wilderness
    /// itself is returned.
    pub fn resolve(
        &self,
        world: &WorldId,
        point: GridPoint,
        candidates: impl IntoIterator<Item = PlotRecord>,
    ) -> ResolvedPlot {
        let mut by_depth: BTreeMap<u32, Polygon> = BTreeMap::new();
        for record in candidates {
            if &record.world != world {
                continue;
            }
            if record.depth == 0 {
                warn!(
                    "plot {}: stored at depth 0, which is reserved for the wilderness",
                    record.id
                );
                continue;
            }
            let polygon = match Polygon::from_record(&record) {
                Ok(p) => p,
                Err(e) => {
                    warn!("plot {}: unreadable vertices, skipped: {}", record.id, e);
                    continue;
                }
            };
            if !polygon.contains_point(point) {
                continue;
            }
            if let Some(existing) = by_depth.get(&polygon.depth()) {
                warn!(
                    "plots {} and {} both cover {} at depth {}, keeping {}",
                    existing.id(),
                    polygon.id(),
                    point,
                    polygon.depth(),
                    existing.id()
                );
                continue;
            }
            by_depth.insert(polygon.depth(), polygon);
        }

        let parent_ids: HashMap<u32, PlotId> =
            by_depth.iter().map(|(d, p)| (*d, p.id())).collect();

        let mut ancestry = PlotArena::new();
        ancestry.insert(Polygon::wilderness(world.clone()));
        let mut innermost = None;

        for (depth, mut polygon) in by_depth {
            let parent = if depth == 1 {
                Some(WILDERNESS_ID)
            } else {
                let parent = parent_ids.get(&(depth - 1)).copied();
                if parent.is_none() {
                    warn!(
                        "plot {} at depth {} has no covering parent at depth {}",
                        polygon.id(),
                        depth,
                        depth - 1
                    );
                }
                parent
            };
            polygon.set_parent(parent);
            if let Some(prev) = innermost.replace(polygon) {
                ancestry.insert(prev);
            }
        }

        let plot = match innermost {
            Some(p) => p,
            None => ancestry
                .remove(WILDERNESS_ID)
                .unwrap_or_else(|| Polygon::wilderness(world.clone())),
        };
        debug!(
            "resolved {} in {} to plot {} (depth {})",
            point,
            world,
            plot.id(),
            plot.depth()
        );
        ResolvedPlot {
            plot,
            ancestry,
            max_chain_depth: self.max_chain_depth,
        }
    }
}

/// Plots newly entered when moving from `from` to `to`: the innermost plot
/// of `to` followed by each of its ancestors that `from` was not already
/// inside. Empty when both resolve to the same plot.
pub fn entered_plots(from: &ResolvedPlot, to: &ResolvedPlot) -> Vec<PlotId> {
    if from.plot().id() == to.plot().id() {
        return Vec::new();
    }
    let before: HashSet<PlotId> = from.chain().iter().map(|p| p.id()).collect();
    let mut entered = vec![to.plot().id()];
    for ancestor in to.ancestors() {
        if before.contains(&ancestor.id()) {
            break;
        }
        entered.push(ancestor.id());
    }
    entered
}
