use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ClaimAction;

/// Where a queued action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSource {
    Player,
    Console,
    Automation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedClaim {
    pub tick: u64,
    pub source: ActionSource,
    pub action: ClaimAction,
}

/// Pending claim actions, executed in FIFO order on the next update.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimQueue {
    pending: Vec<QueuedClaim>,
}

impl ClaimQueue {
    pub fn push(&mut self, tick: u64, source: ActionSource, action: ClaimAction) {
        self.pending.push(QueuedClaim {
            tick,
            source,
            action,
        });
    }

    pub fn push_queued(&mut self, queued: QueuedClaim) {
        self.pending.push(queued);
    }

    pub fn drain(&mut self) -> Vec<QueuedClaim> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
