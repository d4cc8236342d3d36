//! Read-only questions hosts ask between actions: which plot is here, may
//! this user do that, which plots did a move just enter.

use plots::{
    entered_plots, CapabilityProvider, ClaimsConfig, GridPoint, GroupDirectory, OwnershipPolicy,
    PlotActivity, PlotHierarchyResolver, PlotId, PlotStore, ResolvedPlot, UserId, WorldId,
};

/// Resolve the innermost plot at `at` from the store's candidates.
pub fn resolve_at(
    store: &dyn PlotStore,
    config: &ClaimsConfig,
    world: &WorldId,
    at: GridPoint,
) -> ResolvedPlot {
    PlotHierarchyResolver::new(config.max_chain_depth).resolve(
        world,
        at,
        store.candidates_at(world, at),
    )
}

/// Borrowed view over everything a permission check needs.
pub struct PlotAccess<'a> {
    store: &'a dyn PlotStore,
    groups: &'a GroupDirectory,
    capabilities: &'a dyn CapabilityProvider,
    config: &'a ClaimsConfig,
}

impl<'a> PlotAccess<'a> {
    pub fn new(
        store: &'a dyn PlotStore,
        groups: &'a GroupDirectory,
        capabilities: &'a dyn CapabilityProvider,
        config: &'a ClaimsConfig,
    ) -> Self {
        Self {
            store,
            groups,
            capabilities,
            config,
        }
    }

    pub fn resolve(&self, world: &WorldId, at: GridPoint) -> ResolvedPlot {
        resolve_at(self.store, self.config, world, at)
    }

    pub fn policy(&self) -> OwnershipPolicy<'a> {
        OwnershipPolicy::new(self.groups, self.capabilities, self.config)
    }

    /// Whether `user` may perform `activity` at `at`.
    pub fn permits(
        &self,
        world: &WorldId,
        at: GridPoint,
        user: UserId,
        activity: PlotActivity,
    ) -> bool {
        let resolved = self.resolve(world, at);
        self.policy().permits(&resolved, user, activity)
    }

    /// Plots newly entered when moving from `from` to `to` in `world`.
    pub fn entered(&self, world: &WorldId, from: GridPoint, to: GridPoint) -> Vec<PlotId> {
        entered_plots(&self.resolve(world, from), &self.resolve(world, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plots::{CapabilityGrants, MemoryPlotStore, NoAncestry, PlotOwner, Polygon, WILDERNESS_ID};

    const ALICE: UserId = UserId::from_u128(1);
    const BOB: UserId = UserId::from_u128(2);

    fn overworld() -> WorldId {
        WorldId::new("overworld")
    }

    fn store_with_square() -> MemoryPlotStore {
        let mut plot = Polygon::with_vertices(
            1,
            Some(PlotOwner::User(ALICE)),
            overworld(),
            Vec::new(),
            1,
        );
        for (x, z) in [(0, 0), (0, 10), (10, 10), (10, 0)] {
            plot.add_point(GridPoint::from_block(x, z), &NoAncestry).unwrap();
        }
        plot.set_parent(Some(WILDERNESS_ID));
        let mut store = MemoryPlotStore::new();
        store.save(plot.to_record());
        store
    }

    #[test]
    fn resolve_at_finds_square_and_wilderness() {
        let store = store_with_square();
        let config = ClaimsConfig::default();
        let inside = resolve_at(&store, &config, &overworld(), GridPoint::from_block(5, 5));
        assert_eq!(inside.plot().id(), 1);
        let outside = resolve_at(&store, &config, &overworld(), GridPoint::from_block(50, 5));
        assert!(outside.plot().is_wilderness());
    }

    #[test]
    fn permits_follows_owner() {
        let store = store_with_square();
        let groups = GroupDirectory::default();
        let capabilities = CapabilityGrants::default();
        let config = ClaimsConfig::default();
        let access = PlotAccess::new(&store, &groups, &capabilities, &config);

        let center = GridPoint::from_block(5, 5);
        assert!(access.permits(&overworld(), center, ALICE, PlotActivity::Build));
        assert!(!access.permits(&overworld(), center, BOB, PlotActivity::Build));
        // Use needs only outsider rank, but a user owner admits nobody else
        assert!(!access.permits(&overworld(), center, BOB, PlotActivity::Use));
        assert!(access.permits(
            &overworld(),
            GridPoint::from_block(50, 50),
            BOB,
            PlotActivity::Use
        ));
    }

    #[test]
    fn entered_reports_boundary_crossing() {
        let store = store_with_square();
        let groups = GroupDirectory::default();
        let capabilities = CapabilityGrants::default();
        let config = ClaimsConfig::default();
        let access = PlotAccess::new(&store, &groups, &capabilities, &config);

        let outside = GridPoint::from_block(-5, 5);
        let inside = GridPoint::from_block(5, 5);
        assert_eq!(access.entered(&overworld(), outside, inside), vec![1]);
        assert_eq!(access.entered(&overworld(), inside, outside), vec![WILDERNESS_ID]);
        assert!(access.entered(&overworld(), inside, GridPoint::from_block(6, 6)).is_empty());
    }
}
