use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ClaimError;
use crate::owner::{UserId, EVERYONE_GROUP_NAME};
use crate::save::{decode_snapshot, Saveable};

/// Standing of a user inside a group. Ordered from least to most trusted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Rank {
    #[default]
    Outsider,
    Member,
    Assistant,
    Operator,
}

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::Outsider, Rank::Member, Rank::Assistant, Rank::Operator];

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(level as usize).copied()
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub const fn lowest() -> Self {
        Rank::Outsider
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Outsider => "outsider",
            Rank::Member => "member",
            Rank::Assistant => "assistant",
            Rank::Operator => "operator",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    members: BTreeMap<UserId, Rank>,
    /// Cosmetic chat colour, passed through to hosts untouched.
    pub chat_color: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
            chat_color: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank_of(&self, user: UserId) -> Option<Rank> {
        self.members.get(&user).copied()
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains_key(&user)
    }

    pub fn members(&self) -> impl Iterator<Item = (UserId, Rank)> + '_ {
        self.members.iter().map(|(id, rank)| (*id, *rank))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add_member(&mut self, user: UserId, rank: Rank) -> Result<(), ClaimError> {
        if self.members.contains_key(&user) {
            return Err(ClaimError::AlreadyPresent);
        }
        self.members.insert(user, rank);
        Ok(())
    }

    pub fn remove_member(&mut self, user: UserId) -> Result<Rank, ClaimError> {
        self.members.remove(&user).ok_or(ClaimError::NotPresent)
    }

    pub fn set_rank(&mut self, user: UserId, rank: Rank) -> Result<(), ClaimError> {
        match self.members.get_mut(&user) {
            Some(slot) => {
                *slot = rank;
                Ok(())
            }
            None => Err(ClaimError::NotPresent),
        }
    }

    /// Whether `user` satisfies `required` within this group.
    ///
    /// Operator needs the exact rank, assistant accepts assistant or better,
    /// member accepts any membership and outsider accepts anybody.
    pub fn grants(&self, user: UserId, required: Rank) -> bool {
        let rank = self.rank_of(user);
        match required {
            Rank::Operator => rank == Some(Rank::Operator),
            Rank::Assistant => rank.is_some_and(|r| r >= Rank::Assistant),
            Rank::Member => rank.is_some(),
            Rank::Outsider => true,
        }
    }
}

/// Every known group, by name.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDirectory {
    groups: BTreeMap<String, Group>,
}

impl GroupDirectory {
    /// Create a group with `founder` as its operator.
    pub fn create(&mut self, name: &str, founder: UserId) -> Result<&mut Group, ClaimError> {
        let name = name.trim();
        if name.is_empty() || name == EVERYONE_GROUP_NAME || name.contains(':') {
            return Err(ClaimError::WrongUsage);
        }
        if self.groups.contains_key(name) {
            return Err(ClaimError::AlreadyPresent);
        }
        let mut group = Group::new(name);
        group.add_member(founder, Rank::Operator)?;
        Ok(self.groups.entry(name.to_string()).or_insert(group))
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Group> {
        self.groups.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Groups `user` belongs to, with their rank in each.
    pub fn memberships(&self, user: UserId) -> Vec<(&str, Rank)> {
        self.groups
            .values()
            .filter_map(|g| g.rank_of(user).map(|r| (g.name(), r)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// =============================================================================
// Saveable
// =============================================================================

#[derive(Encode, Decode, Default)]
struct GroupDirectorySave {
    groups: Vec<GroupSave>,
}

#[derive(Encode, Decode)]
struct GroupSave {
    name: String,
    members: Vec<(u128, u8)>,
    chat_color: Option<String>,
}

impl Saveable for GroupDirectory {
    const SAVE_KEY: &'static str = "plot_groups";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.groups.is_empty() {
            return None;
        }
        let save = GroupDirectorySave {
            groups: self
                .groups
                .values()
                .map(|g| GroupSave {
                    name: g.name.clone(),
                    members: g.members().map(|(id, r)| (id.as_u128(), r.level())).collect(),
                    chat_color: g.chat_color.clone(),
                })
                .collect(),
        };
        Some(bitcode::encode(&save))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let save: GroupDirectorySave = decode_snapshot(Self::SAVE_KEY, bytes);
        let mut directory = GroupDirectory::default();
        for saved in save.groups {
            let mut group = Group::new(saved.name);
            group.chat_color = saved.chat_color;
            for (id, level) in saved.members {
                let rank = Rank::from_level(level).unwrap_or_else(|| {
                    warn!(
                        "group {}: unknown rank level {} for {}, demoting to outsider",
                        group.name, level, id
                    );
                    Rank::Outsider
                });
                group.members.insert(UserId::from_u128(id), rank);
            }
            directory.groups.insert(group.name.clone(), group);
        }
        directory
    }
}
