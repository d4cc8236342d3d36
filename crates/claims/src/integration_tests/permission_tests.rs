//! Integration tests for permission checks against resolved plots.

use plots::{
    ClaimsConfig, GridPoint, PlotActivity, PlotOwner, Rank, RankRequirements, UserId,
    WILDERNESS_ID,
};

use crate::claim_actions::ClaimOutcome;
use crate::queries::PlotAccess;
use crate::test_harness::{overworld, TestRealm};

const ALICE: UserId = UserId::from_u128(1);
const BOB: UserId = UserId::from_u128(2);
const CAROL: UserId = UserId::from_u128(3);
const DAVE: UserId = UserId::from_u128(4);

const BIG_SQUARE: [(i64, i64); 4] = [(0, 0), (0, 20), (20, 20), (20, 0)];
const INNER_SQUARE: [(i64, i64); 4] = [(2, 2), (2, 8), (8, 8), (8, 2)];

fn p(x: i64, z: i64) -> GridPoint {
    GridPoint::from_block(x, z)
}

// -----------------------------------------------------------------------
// Wilderness
// -----------------------------------------------------------------------

#[test]
fn test_wilderness_allows_outsider_activities() {
    let realm = TestRealm::new();
    assert!(realm.can(BOB, (500, -500), PlotActivity::Use));
    assert!(realm.can(BOB, (500, -500), PlotActivity::Place));
    assert!(!realm.can(BOB, (500, -500), PlotActivity::Build));
}

#[test]
fn test_wilderness_capability_unlocks_higher_ranks() {
    let realm = TestRealm::new().with_wilderness_claimer(BOB);
    assert!(realm.can(BOB, (500, -500), PlotActivity::Build));
    assert!(realm.can(BOB, (500, -500), PlotActivity::Delete));
    assert!(!realm.can(ALICE, (500, -500), PlotActivity::Build));
}

#[test]
fn test_unrelated_capability_does_not_count() {
    let realm = TestRealm::new().with_capability(BOB, "plots.admin");
    assert!(!realm.can(BOB, (1, 1), PlotActivity::Build));
}

// -----------------------------------------------------------------------
// Owned plots
// -----------------------------------------------------------------------

#[test]
fn test_user_owner_alone_may_act() {
    let realm = TestRealm::new().with_plot(Some(PlotOwner::User(ALICE)), &BIG_SQUARE);
    assert!(realm.can(ALICE, (5, 5), PlotActivity::Build));
    assert!(realm.can(ALICE, (0, 10), PlotActivity::Delete));
    assert!(!realm.can(BOB, (5, 5), PlotActivity::Use));
    // Just outside the border is wilderness again
    assert!(realm.can(BOB, (21, 10), PlotActivity::Use));
}

#[test]
fn test_group_plot_follows_member_ranks() {
    let realm = TestRealm::new()
        .with_group("crew", ALICE)
        .with_member("crew", BOB, Rank::Assistant)
        .with_member("crew", CAROL, Rank::Member)
        .with_plot(Some(PlotOwner::Group("crew".into())), &BIG_SQUARE);

    assert!(realm.can(ALICE, (5, 5), PlotActivity::Rename));
    assert!(!realm.can(BOB, (5, 5), PlotActivity::Rename));
    assert!(realm.can(BOB, (5, 5), PlotActivity::Build));
    assert!(!realm.can(CAROL, (5, 5), PlotActivity::Build));
    assert!(realm.can(CAROL, (5, 5), PlotActivity::Entity));
    assert!(!realm.can(DAVE, (5, 5), PlotActivity::Entity));
    assert!(realm.can(DAVE, (5, 5), PlotActivity::Use));
}

#[test]
fn test_vacant_child_inherits_parent_owner() {
    let realm = TestRealm::new()
        .with_plot(Some(PlotOwner::User(ALICE)), &BIG_SQUARE)
        .with_plot(None, &INNER_SQUARE);

    assert_eq!(realm.resolve((5, 5)).plot().depth(), 2);
    assert!(realm.can(ALICE, (5, 5), PlotActivity::Build));
    assert!(!realm.can(BOB, (5, 5), PlotActivity::Build));
}

#[test]
fn test_owned_child_overrides_parent_owner() {
    let realm = TestRealm::new()
        .with_plot(Some(PlotOwner::User(ALICE)), &BIG_SQUARE)
        .with_plot(Some(PlotOwner::User(BOB)), &INNER_SQUARE);

    assert!(realm.can(BOB, (5, 5), PlotActivity::Build));
    assert!(!realm.can(ALICE, (5, 5), PlotActivity::Build));
    assert!(realm.can(ALICE, (15, 15), PlotActivity::Build));
}

#[test]
fn test_vacant_top_level_plot_is_everyones() {
    let realm = TestRealm::new().with_plot(None, &BIG_SQUARE);
    assert!(realm.can(BOB, (5, 5), PlotActivity::Use));
    assert!(!realm.can(BOB, (5, 5), PlotActivity::Build));
}

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

#[test]
fn test_configured_ranks_apply() {
    let config = ClaimsConfig {
        ranks: RankRequirements {
            build: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let realm = TestRealm::new()
        .with_config(config)
        .with_group("crew", ALICE)
        .with_member("crew", CAROL, Rank::Member)
        .with_plot(Some(PlotOwner::Group("crew".into())), &BIG_SQUARE);

    assert!(realm.can(CAROL, (5, 5), PlotActivity::Build));
}

#[test]
fn test_custom_wilderness_capability_name() {
    let config = ClaimsConfig {
        wilderness_capability: "server.claim".into(),
        ..Default::default()
    };
    let mut realm = TestRealm::new()
        .with_config(config)
        .with_capability(ALICE, "server.claim");

    assert_eq!(
        realm.claim(ALICE, &[(0, 0), (0, 4), (4, 4), (4, 0)]),
        ClaimOutcome::Success
    );
}

// -----------------------------------------------------------------------
// Movement
// -----------------------------------------------------------------------

#[test]
fn test_entering_nested_plots() {
    let mut realm = TestRealm::new();
    let outer = realm.insert_plot(Some(PlotOwner::User(ALICE)), &BIG_SQUARE);
    let inner = realm.insert_plot(None, &INNER_SQUARE);

    let world = realm.world_mut();
    let access = PlotAccess::new(
        world.resource::<plots::MemoryPlotStore>(),
        world.resource::<plots::GroupDirectory>(),
        world.resource::<plots::CapabilityGrants>(),
        world.resource::<ClaimsConfig>(),
    );
    let w = overworld();

    assert_eq!(access.entered(&w, p(-5, 5), p(5, 5)), vec![inner, outer]);
    assert_eq!(access.entered(&w, p(15, 15), p(5, 5)), vec![inner]);
    assert_eq!(access.entered(&w, p(5, 5), p(15, 15)), vec![outer]);
    assert_eq!(access.entered(&w, p(5, 5), p(-5, 5)), vec![WILDERNESS_ID]);
}
