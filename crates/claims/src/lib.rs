//! Claim sessions on top of the `plots` engine.
//!
//! Users queue [`ClaimAction`]s (start a claim, add vertices, finish, hand
//! a plot over, manage groups). An executor system drains the queue once per
//! update, applies each action against the plot store and group directory,
//! and records the outcome in a bounded log.

pub mod claim_actions;
pub mod queries;
pub mod sessions;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use claim_actions::{
    execute_claim_actions, ActionSource, ClaimAction, ClaimOutcome, ClaimQueue, ClaimResultLog,
    ClaimsPlugin, QueuedClaim,
};
pub use queries::{resolve_at, PlotAccess};
pub use sessions::{ClaimSession, ClaimSessions};
