//! # TestRealm: headless harness for claim-layer integration tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + [`ClaimsPlugin`] so whole
//! claim flows can run without a game server.

use bevy::app::App;
use bevy::prelude::*;
use std::collections::BTreeMap;

use plots::save::{restore_world, snapshot_world};
use plots::{
    CapabilityGrants, ClaimsConfig, GridPoint, GroupDirectory, MemoryPlotStore, PlotActivity,
    PlotId, PlotOwner, PlotStore, Polygon, Rank, ResolvedPlot, UserId, WorldId,
};

use crate::claim_actions::{ActionSource, ClaimAction, ClaimOutcome, ClaimQueue, ClaimResultLog};
use crate::queries::{resolve_at, PlotAccess};
use crate::sessions::ClaimSessions;
use crate::ClaimsPlugin;

/// The world every harness helper works in unless told otherwise.
pub fn overworld() -> WorldId {
    WorldId::new("overworld")
}

/// A headless App wrapping `ClaimsPlugin`.
///
/// Use builder methods to set up groups, capabilities and plots, then push
/// actions with `act()` and query the resulting resources.
pub struct TestRealm {
    app: App,
    tick: u64,
}

impl Default for TestRealm {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRealm {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty realm with the default configuration.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ClaimsPlugin);
        app.update();
        Self { app, tick: 0 }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Replace the configuration. The result log is rebuilt to the new
    /// capacity.
    pub fn with_config(mut self, config: ClaimsConfig) -> Self {
        let log = ClaimResultLog::with_capacity(config.result_log_capacity);
        let world = self.app.world_mut();
        world.insert_resource(config);
        world.insert_resource(log);
        self
    }

    /// Create a group with `founder` as operator.
    pub fn with_group(mut self, name: &str, founder: UserId) -> Self {
        self.app
            .world_mut()
            .resource_mut::<GroupDirectory>()
            .create(name, founder)
            .unwrap_or_else(|e| panic!("group {name} not created: {e}"));
        self
    }

    /// Seat `user` in an existing group at `rank`.
    pub fn with_member(mut self, group: &str, user: UserId, rank: Rank) -> Self {
        {
            let mut groups = self.app.world_mut().resource_mut::<GroupDirectory>();
            let Some(target) = groups.get_mut(group) else {
                panic!("group {group} does not exist");
            };
            target
                .add_member(user, rank)
                .unwrap_or_else(|e| panic!("{user} not added to {group}: {e}"));
        }
        self
    }

    pub fn with_capability(mut self, user: UserId, capability: &str) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CapabilityGrants>()
            .grant(user, capability);
        self
    }

    /// Grant the configured wilderness capability to `user`.
    pub fn with_wilderness_claimer(self, user: UserId) -> Self {
        let capability = self.resource::<ClaimsConfig>().wilderness_capability.clone();
        self.with_capability(user, &capability)
    }

    /// Store a plot drawn through `vertices`, nested in whatever plot holds
    /// the first vertex. Skips permission checks but not geometry rules.
    pub fn with_plot(mut self, owner: Option<PlotOwner>, vertices: &[(i64, i64)]) -> Self {
        self.insert_plot(owner, vertices);
        self
    }

    /// Like [`Self::with_plot`], returning the new plot's id.
    pub fn insert_plot(&mut self, owner: Option<PlotOwner>, vertices: &[(i64, i64)]) -> PlotId {
        let Some(&first) = vertices.first() else {
            panic!("a plot needs at least one vertex");
        };
        let (parent, mut ancestry) = self.resolve(first).into_parts();

        let world = self.app.world_mut();
        let mut store = world.resource_mut::<MemoryPlotStore>();
        let mut polygon = Polygon::new_child(store.allocate_id(), owner, &parent);
        ancestry.insert(parent);
        for &v in vertices {
            polygon
                .add_point(GridPoint::from(v), &ancestry)
                .unwrap_or_else(|e| panic!("vertex {v:?} rejected: {e}"));
        }
        assert!(
            polygon.is_complete(&ancestry) && polygon.is_valid_shape(&ancestry),
            "plot through {vertices:?} is not a valid closed shape"
        );
        let id = polygon.id();
        store.save(polygon.to_record());
        id
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Queue `action`, run one update, and return its outcome.
    pub fn act(&mut self, action: ClaimAction) -> ClaimOutcome {
        self.app
            .world_mut()
            .resource_mut::<ClaimQueue>()
            .push(self.tick, ActionSource::Player, action);
        self.tick(1);
        self.resource::<ClaimResultLog>()
            .last_outcome()
            .unwrap_or_else(|| panic!("executor logged nothing"))
    }

    /// Run a whole claim for `actor`: start at the first vertex, add the
    /// rest, finish. Stops at the first refusal and returns it.
    pub fn claim(&mut self, actor: UserId, vertices: &[(i64, i64)]) -> ClaimOutcome {
        let Some((&first, rest)) = vertices.split_first() else {
            panic!("a claim needs at least one vertex");
        };
        let outcome = self.act(ClaimAction::StartClaim {
            actor,
            world: overworld(),
            at: first,
        });
        if !outcome.is_success() {
            return outcome;
        }
        for &at in rest {
            let outcome = self.act(ClaimAction::AddVertex { actor, at });
            if !outcome.is_success() {
                return outcome;
            }
        }
        self.act(ClaimAction::FinishClaim { actor })
    }

    /// Run `n` updates.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
            self.tick += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn store(&self) -> &MemoryPlotStore {
        self.resource::<MemoryPlotStore>()
    }

    pub fn sessions(&self) -> &ClaimSessions {
        self.resource::<ClaimSessions>()
    }

    pub fn groups(&self) -> &GroupDirectory {
        self.resource::<GroupDirectory>()
    }

    /// Resolve the plot at `at` in the overworld.
    pub fn resolve(&self, at: (i64, i64)) -> ResolvedPlot {
        let world = self.app.world();
        resolve_at(
            world.resource::<MemoryPlotStore>(),
            world.resource::<ClaimsConfig>(),
            &overworld(),
            at.into(),
        )
    }

    /// Whether `user` may perform `activity` at `at` in the overworld.
    pub fn can(&self, user: UserId, at: (i64, i64), activity: PlotActivity) -> bool {
        let world = self.app.world();
        PlotAccess::new(
            world.resource::<MemoryPlotStore>(),
            world.resource::<GroupDirectory>(),
            world.resource::<CapabilityGrants>(),
            world.resource::<ClaimsConfig>(),
        )
        .permits(&overworld(), at.into(), user, activity)
    }

    /// Capture every registered snapshot resource.
    pub fn snapshot(&mut self) -> BTreeMap<String, Vec<u8>> {
        snapshot_world(self.app.world_mut())
    }

    /// Restore a snapshot taken with [`Self::snapshot`].
    pub fn restore(&mut self, snapshot: &BTreeMap<String, Vec<u8>>) {
        restore_world(self.app.world_mut(), snapshot);
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_resource_exists<T: Resource>(&self) {
        assert!(
            self.app.world().get_resource::<T>().is_some(),
            "Expected resource {} to exist",
            std::any::type_name::<T>()
        );
    }

    pub fn assert_plot_count(&self, expected: usize) {
        let actual = self.store().len();
        assert_eq!(actual, expected, "Expected {expected} stored plots, got {actual}");
    }
}
