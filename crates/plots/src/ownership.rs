//! Who may do what inside a plot.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use std::collections::{BTreeSet, HashMap};

use crate::config::{ClaimsConfig, PlotActivity};
use crate::groups::{GroupDirectory, Rank};
use crate::hierarchy::{PlotLookup, ResolvedPlot};
use crate::owner::{PlotOwner, UserId};
use crate::polygon::Polygon;
use crate::save::{decode_snapshot, Saveable};

/// Host-side named permissions (e.g. the wilderness claim right).
pub trait CapabilityProvider {
    fn has_capability(&self, user: UserId, capability: &str) -> bool;
}

/// In-process capability table.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityGrants {
    grants: HashMap<UserId, BTreeSet<String>>,
}

impl CapabilityGrants {
    pub fn grant(&mut self, user: UserId, capability: impl Into<String>) {
        self.grants.entry(user).or_default().insert(capability.into());
    }

    pub fn revoke(&mut self, user: UserId, capability: &str) -> bool {
        let Some(set) = self.grants.get_mut(&user) else {
            return false;
        };
        let removed = set.remove(capability);
        if set.is_empty() {
            self.grants.remove(&user);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl CapabilityProvider for CapabilityGrants {
    fn has_capability(&self, user: UserId, capability: &str) -> bool {
        self.grants
            .get(&user)
            .is_some_and(|set| set.contains(capability))
    }
}

#[derive(Encode, Decode, Default)]
struct CapabilityGrantsSave {
    grants: Vec<(u128, Vec<String>)>,
}

impl Saveable for CapabilityGrants {
    const SAVE_KEY: &'static str = "plot_capabilities";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.grants.is_empty() {
            return None;
        }
        let mut grants: Vec<(u128, Vec<String>)> = self
            .grants
            .iter()
            .map(|(user, set)| (user.as_u128(), set.iter().cloned().collect()))
            .collect();
        grants.sort();
        Some(bitcode::encode(&CapabilityGrantsSave { grants }))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let save: CapabilityGrantsSave = decode_snapshot(Self::SAVE_KEY, bytes);
        let mut out = CapabilityGrants::default();
        for (user, capabilities) in save.grants {
            for capability in capabilities {
                out.grant(UserId::from_u128(user), capability);
            }
        }
        out
    }
}

/// The owner that governs `plot`: its own, else the nearest owned ancestor.
///
/// Depth 0 and 1 plots without a parent link fall back to everyone, since
/// their parent is the wilderness. A deeper plot whose chain breaks before
/// an owner is found yields `None`.
pub fn effective_owner<L: PlotLookup + ?Sized>(
    plot: &Polygon,
    ancestry: &L,
    max_chain_depth: usize,
) -> Option<PlotOwner> {
    if let Some(owner) = plot.owner() {
        return Some(owner.clone());
    }
    let mut current = plot;
    for _ in 0..max_chain_depth {
        let Some(parent_id) = current.parent() else {
            return (current.depth() <= 1).then_some(PlotOwner::Everyone);
        };
        let parent = ancestry.plot(parent_id)?;
        if let Some(owner) = parent.owner() {
            return Some(owner.clone());
        }
        current = parent;
    }
    warn!(
        "plot {}: no owner within {} ancestors",
        plot.id(),
        max_chain_depth
    );
    None
}

/// Permission checks against groups, capabilities and the rank table.
pub struct OwnershipPolicy<'a> {
    groups: &'a GroupDirectory,
    capabilities: &'a dyn CapabilityProvider,
    config: &'a ClaimsConfig,
}

impl<'a> OwnershipPolicy<'a> {
    pub fn new(
        groups: &'a GroupDirectory,
        capabilities: &'a dyn CapabilityProvider,
        config: &'a ClaimsConfig,
    ) -> Self {
        Self {
            groups,
            capabilities,
            config,
        }
    }

    pub fn effective_owner<L: PlotLookup + ?Sized>(
        &self,
        plot: &Polygon,
        ancestry: &L,
    ) -> Option<PlotOwner> {
        effective_owner(plot, ancestry, self.config.max_chain_depth)
    }

    /// Whether `user` holds at least `required` under `owner`.
    ///
    /// A user owner matches only that user. Everyone admits anybody for
    /// outsider-level activities and otherwise needs the wilderness
    /// capability. A group defers to the member's rank; unknown groups
    /// admit nobody.
    pub fn contains_user(&self, owner: &PlotOwner, user: UserId, required: Rank) -> bool {
        match owner {
            PlotOwner::User(id) => *id == user,
            PlotOwner::Everyone => {
                required == Rank::lowest()
                    || self
                        .capabilities
                        .has_capability(user, &self.config.wilderness_capability)
            }
            PlotOwner::Group(name) => self
                .groups
                .get(name)
                .is_some_and(|g| g.grants(user, required)),
        }
    }

    /// Whether `user` may perform `activity` inside the resolved plot.
    pub fn permits(&self, resolved: &ResolvedPlot, user: UserId, activity: PlotActivity) -> bool {
        let Some(owner) = self.effective_owner(resolved.plot(), resolved.ancestry()) else {
            debug!(
                "plot {}: no effective owner, denying {:?} to {}",
                resolved.plot().id(),
                activity,
                user
            );
            return false;
        };
        self.contains_user(&owner, user, self.config.ranks.plot(activity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{NoAncestry, PlotArena};
    use crate::owner::WorldId;

    const ALICE: UserId = UserId::from_u128(1);
    const BOB: UserId = UserId::from_u128(2);
    const CAROL: UserId = UserId::from_u128(3);
    const DEFAULT_CAP: &str = crate::config::DEFAULT_WILDERNESS_CAPABILITY;

    fn world() -> WorldId {
        WorldId::new("overworld")
    }

    fn directory() -> GroupDirectory {
        let mut dir = GroupDirectory::default();
        let crew = dir.create("crew", ALICE).unwrap();
        crew.add_member(BOB, Rank::Member).unwrap();
        dir
    }

    #[test]
    fn test_user_owner_matches_only_that_user() {
        let dir = GroupDirectory::default();
        let caps = CapabilityGrants::default();
        let config = ClaimsConfig::default();
        let policy = OwnershipPolicy::new(&dir, &caps, &config);
        let owner = PlotOwner::User(ALICE);
        assert!(policy.contains_user(&owner, ALICE, Rank::Operator));
        assert!(!policy.contains_user(&owner, BOB, Rank::Outsider));
    }

    #[test]
    fn test_everyone_owner_needs_capability_above_outsider() {
        let dir = GroupDirectory::default();
        let mut caps = CapabilityGrants::default();
        caps.grant(ALICE, DEFAULT_CAP);
        let config = ClaimsConfig::default();
        let policy = OwnershipPolicy::new(&dir, &caps, &config);

        assert!(policy.contains_user(&PlotOwner::Everyone, BOB, Rank::Outsider));
        assert!(!policy.contains_user(&PlotOwner::Everyone, BOB, Rank::Assistant));
        assert!(policy.contains_user(&PlotOwner::Everyone, ALICE, Rank::Assistant));
    }

    #[test]
    fn test_group_owner_rank_rules() {
        let dir = directory();
        let caps = CapabilityGrants::default();
        let config = ClaimsConfig::default();
        let policy = OwnershipPolicy::new(&dir, &caps, &config);
        let crew = PlotOwner::Group("crew".into());

        assert!(policy.contains_user(&crew, ALICE, Rank::Operator));
        assert!(!policy.contains_user(&crew, BOB, Rank::Assistant));
        assert!(policy.contains_user(&crew, BOB, Rank::Member));
        assert!(!policy.contains_user(&crew, CAROL, Rank::Member));
        assert!(policy.contains_user(&crew, CAROL, Rank::Outsider));
        assert!(!policy.contains_user(&PlotOwner::Group("ghosts".into()), ALICE, Rank::Outsider));
    }

    #[test]
    fn test_effective_owner_walks_up_to_owned_ancestor() {
        let wild = Polygon::wilderness(world());
        let owned = Polygon::new_child(1, Some(PlotOwner::User(ALICE)), &wild);
        let vacant = Polygon::new_child(2, None, &owned);
        let deeper = Polygon::new_child(3, None, &vacant);
        let mut arena = PlotArena::new();
        arena.insert(wild);
        arena.insert(owned);
        arena.insert(vacant);

        assert_eq!(
            effective_owner(&deeper, &arena, 100),
            Some(PlotOwner::User(ALICE))
        );
    }

    #[test]
    fn test_effective_owner_of_vacant_top_level_is_everyone() {
        let wild = Polygon::wilderness(world());
        let vacant = Polygon::new_child(1, None, &wild);
        let mut arena = PlotArena::new();
        arena.insert(wild);
        assert_eq!(effective_owner(&vacant, &arena, 100), Some(PlotOwner::Everyone));

        let unlinked = Polygon::with_vertices(5, None, world(), Vec::new(), 1);
        assert_eq!(effective_owner(&unlinked, &NoAncestry, 100), Some(PlotOwner::Everyone));
    }

    #[test]
    fn test_effective_owner_broken_chain_is_none() {
        let orphan = Polygon::with_vertices(5, None, world(), Vec::new(), 3);
        assert_eq!(effective_owner(&orphan, &NoAncestry, 100), None);

        let wild = Polygon::wilderness(world());
        let missing_parent = Polygon::new_child(9, None, &wild);
        let detached = Polygon::new_child(10, None, &missing_parent);
        assert_eq!(effective_owner(&detached, &NoAncestry, 100), None);
    }

    #[test]
    fn test_capability_grants() {
        let mut caps = CapabilityGrants::default();
        caps.grant(ALICE, "a");
        caps.grant(ALICE, "b");
        assert!(caps.has_capability(ALICE, "a"));
        assert!(!caps.has_capability(BOB, "a"));
        assert!(caps.revoke(ALICE, "a"));
        assert!(!caps.revoke(ALICE, "a"));
        assert!(caps.revoke(ALICE, "b"));
        assert!(caps.is_empty());
    }

    #[test]
    fn test_capability_grants_saveable_round_trip() {
        let mut caps = CapabilityGrants::default();
        caps.grant(ALICE, DEFAULT_CAP);
        caps.grant(BOB, "x");
        caps.grant(BOB, "y");
        let bytes = caps.save_to_bytes().expect("non-empty grants save");
        assert_eq!(CapabilityGrants::load_from_bytes(&bytes), caps);
        assert!(CapabilityGrants::default().save_to_bytes().is_none());
    }
}
