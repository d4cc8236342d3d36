//! Plugin that wires up the claim layer: engine resources, snapshots, queue,
//! sessions, executor and log.

use bevy::prelude::*;

use plots::{CapabilityGrants, ClaimsConfig, GroupDirectory, MemoryPlotStore, SaveableAppExt};

use super::executor::execute_claim_actions;
use super::result_log::ClaimResultLog;
use super::ClaimQueue;
use crate::sessions::ClaimSessions;

/// Registers the claim resources and the executor system. A `ClaimsConfig`
/// inserted before the plugin is kept.
pub struct ClaimsPlugin;

impl Plugin for ClaimsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClaimsConfig>();
        app.init_resource::<MemoryPlotStore>();
        app.init_resource::<GroupDirectory>();
        app.init_resource::<CapabilityGrants>();
        app.init_resource::<ClaimSessions>();
        app.init_resource::<ClaimQueue>();
        // After the config so the log picks up its capacity.
        app.init_resource::<ClaimResultLog>();

        app.register_saveable::<MemoryPlotStore>()
            .register_saveable::<GroupDirectory>()
            .register_saveable::<CapabilityGrants>();

        app.add_systems(Update, execute_claim_actions);
    }
}
