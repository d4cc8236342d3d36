use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::groups::Rank;
use crate::hierarchy::DEFAULT_MAX_CHAIN_DEPTH;

pub const DEFAULT_WILDERNESS_CAPABILITY: &str = "plots.wilderness.claim";
pub const DEFAULT_RESULT_LOG_CAPACITY: usize = 64;

/// Something a user does inside a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotActivity {
    Build,
    Break,
    Entity,
    Use,
    Claim,
    Give,
    Rename,
    Delete,
    Place,
}

/// Something a user does to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupActivity {
    Add,
    Remove,
    Rank,
}

/// Minimum rank level (0 outsider .. 3 operator) per activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankRequirements {
    pub build: u8,
    #[serde(rename = "break")]
    pub breaking: u8,
    pub entity: u8,
    #[serde(rename = "use")]
    pub interact: u8,
    pub claim: u8,
    pub give: u8,
    pub rename: u8,
    pub delete: u8,
    pub place: u8,
    pub group_add: u8,
    pub group_remove: u8,
    pub group_rank: u8,
}

impl Default for RankRequirements {
    fn default() -> Self {
        Self {
            build: 2,
            breaking: 2,
            entity: 1,
            interact: 0,
            claim: 2,
            give: 2,
            rename: 3,
            delete: 3,
            place: 0,
            group_add: 2,
            group_remove: 3,
            group_rank: 3,
        }
    }
}

impl RankRequirements {
    pub fn plot(&self, activity: PlotActivity) -> Rank {
        let level = match activity {
            PlotActivity::Build => self.build,
            PlotActivity::Break => self.breaking,
            PlotActivity::Entity => self.entity,
            PlotActivity::Use => self.interact,
            PlotActivity::Claim => self.claim,
            PlotActivity::Give => self.give,
            PlotActivity::Rename => self.rename,
            PlotActivity::Delete => self.delete,
            PlotActivity::Place => self.place,
        };
        strictest_for(level)
    }

    pub fn group(&self, activity: GroupActivity) -> Rank {
        let level = match activity {
            GroupActivity::Add => self.group_add,
            GroupActivity::Remove => self.group_remove,
            GroupActivity::Rank => self.group_rank,
        };
        strictest_for(level)
    }

    fn levels(&self) -> [(&'static str, u8); 12] {
        [
            ("build", self.build),
            ("break", self.breaking),
            ("entity", self.entity),
            ("use", self.interact),
            ("claim", self.claim),
            ("give", self.give),
            ("rename", self.rename),
            ("delete", self.delete),
            ("place", self.place),
            ("group_add", self.group_add),
            ("group_remove", self.group_remove),
            ("group_rank", self.group_rank),
        ]
    }
}

/// Out-of-range levels require operator.
fn strictest_for(level: u8) -> Rank {
    Rank::from_level(level).unwrap_or(Rank::Operator)
}

/// Tunables for permission checks and claim sessions.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    pub ranks: RankRequirements,
    /// Capability that lets a user claim inside the wilderness (or any
    /// everyone-owned plot) when the required rank is above outsider.
    pub wilderness_capability: String,
    pub max_chain_depth: usize,
    pub result_log_capacity: usize,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            ranks: RankRequirements::default(),
            wilderness_capability: DEFAULT_WILDERNESS_CAPABILITY.to_string(),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            result_log_capacity: DEFAULT_RESULT_LOG_CAPACITY,
        }
    }
}

impl ClaimsConfig {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("JSON decode error: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, level) in self.ranks.levels() {
            if Rank::from_level(level).is_none() {
                return Err(format!("rank level for '{name}' is {level}, must be 0..=3"));
            }
        }
        if self.wilderness_capability.trim().is_empty() {
            return Err("wilderness_capability must not be empty".to_string());
        }
        if self.max_chain_depth == 0 {
            return Err("max_chain_depth must be at least 1".to_string());
        }
        if self.result_log_capacity == 0 {
            return Err("result_log_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
