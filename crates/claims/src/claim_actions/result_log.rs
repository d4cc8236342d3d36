//! Ring-buffer log of recently executed claim actions and their outcomes.
//!
//! The [`ClaimResultLog`] keeps the last `result_log_capacity` pairs from
//! [`ClaimsConfig`], so hosts can report refusals back to the acting user
//! without hooking into the executor.

use bevy::prelude::*;

use plots::config::DEFAULT_RESULT_LOG_CAPACITY;
use plots::ClaimsConfig;

use super::{ClaimAction, ClaimOutcome};

#[derive(Resource, Debug, Clone)]
pub struct ClaimResultLog {
    entries: Vec<(ClaimAction, ClaimOutcome)>,
    capacity: usize,
}

impl FromWorld for ClaimResultLog {
    fn from_world(world: &mut World) -> Self {
        let capacity = world
            .get_resource::<ClaimsConfig>()
            .map_or(DEFAULT_RESULT_LOG_CAPACITY, |c| c.result_log_capacity);
        Self::with_capacity(capacity)
    }
}

impl ClaimResultLog {
    /// A log holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new action/outcome pair. If the buffer is full the oldest
    /// entry is evicted.
    pub fn push(&mut self, action: ClaimAction, outcome: ClaimOutcome) {
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((action, outcome));
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[(ClaimAction, ClaimOutcome)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// The most recent outcome, if any action ran.
    pub fn last_outcome(&self) -> Option<ClaimOutcome> {
        self.entries.last().map(|(_, outcome)| *outcome)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
