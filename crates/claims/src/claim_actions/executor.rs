//! Claim executor system: drains the [`ClaimQueue`] each update and applies
//! every queued [`ClaimAction`] against the plot store, the group directory
//! and the open claim sessions, recording outcomes in the [`ClaimResultLog`].
//!
//! Each action variant has its own execution function that validates the
//! request, mutates state only on success, and returns a
//! `Result<(), ClaimError>`.

use bevy::prelude::*;

use plots::{
    CapabilityGrants, CapabilityProvider, ClaimError, ClaimsConfig, GridPoint, GroupActivity,
    GroupDirectory, MemoryPlotStore, OwnershipPolicy, PlotActivity, PlotOwner, PlotStore, Polygon,
    Rank, UserId, WorldId,
};

use super::result_log::ClaimResultLog;
use super::{ClaimAction, ClaimOutcome, ClaimQueue};
use crate::queries::resolve_at;
use crate::sessions::{ClaimSession, ClaimSessions};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Drains all pending claim actions and executes them in order.
#[allow(clippy::too_many_arguments)]
pub fn execute_claim_actions(
    mut queue: ResMut<ClaimQueue>,
    mut log: ResMut<ClaimResultLog>,
    mut store: ResMut<MemoryPlotStore>,
    mut groups: ResMut<GroupDirectory>,
    mut sessions: ResMut<ClaimSessions>,
    capabilities: Res<CapabilityGrants>,
    config: Res<ClaimsConfig>,
) {
    let actions = queue.drain();
    if actions.is_empty() {
        return;
    }
    let mut ctx = ClaimContext {
        store: &mut *store,
        groups: &mut *groups,
        sessions: &mut *sessions,
        capabilities: &*capabilities,
        config: &*config,
    };
    for queued in actions {
        let outcome = execute_single(&queued.action, queued.tick, &mut ctx);
        debug!(
            "{} by {} ({:?}, tick {}): {:?}",
            queued.action.name(),
            queued.action.actor(),
            queued.source,
            queued.tick,
            outcome
        );
        log.push(queued.action, outcome);
    }
}

/// Everything an action may read or change.
pub struct ClaimContext<'a> {
    pub store: &'a mut dyn PlotStore,
    pub groups: &'a mut GroupDirectory,
    pub sessions: &'a mut ClaimSessions,
    pub capabilities: &'a dyn CapabilityProvider,
    pub config: &'a ClaimsConfig,
}

impl ClaimContext<'_> {
    fn policy(&self) -> OwnershipPolicy<'_> {
        OwnershipPolicy::new(&*self.groups, self.capabilities, self.config)
    }

    fn plot_rank(&self, activity: PlotActivity) -> Rank {
        self.config.ranks.plot(activity)
    }

    fn group_rank(&self, activity: GroupActivity) -> Rank {
        self.config.ranks.group(activity)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Apply one action. Exposed so hosts can run actions synchronously.
pub fn execute_single(action: &ClaimAction, tick: u64, ctx: &mut ClaimContext) -> ClaimOutcome {
    let result = match action {
        ClaimAction::StartClaim { actor, world, at } => {
            execute_start_claim(*actor, world, (*at).into(), tick, ctx)
        }
        ClaimAction::AddVertex { actor, at } => execute_add_vertex(*actor, (*at).into(), ctx),
        ClaimAction::FinishClaim { actor } => execute_finish_claim(*actor, ctx),
        ClaimAction::AbortClaim { actor } => execute_abort_claim(*actor, ctx),
        ClaimAction::GivePlot {
            actor,
            world,
            at,
            receiver,
        } => execute_give_plot(*actor, world, (*at).into(), receiver, ctx),
        ClaimAction::CreateGroup { actor, name } => execute_create_group(*actor, name, ctx),
        ClaimAction::AddMember {
            actor,
            group,
            user,
        } => execute_add_member(*actor, group, *user, ctx),
        ClaimAction::RemoveMember {
            actor,
            group,
            user,
        } => execute_remove_member(*actor, group, *user, ctx),
        ClaimAction::RankMember {
            actor,
            group,
            user,
            rank,
        } => execute_rank_member(*actor, group, *user, *rank, ctx),
    };
    result.into()
}

// ---------------------------------------------------------------------------
// Claim sessions
// ---------------------------------------------------------------------------

fn execute_start_claim(
    actor: UserId,
    world: &WorldId,
    at: GridPoint,
    tick: u64,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    if ctx.sessions.end(actor).is_some() {
        debug!("{} restarted a claim, previous session dropped", actor);
    }

    let (parent, mut ancestry) = resolve_at(&*ctx.store, ctx.config, world, at).into_parts();
    // Claims are carved only from plots that name their own owner.
    let Some(owner) = parent.owner() else {
        return Err(ClaimError::WrongUsage);
    };
    if !ctx
        .policy()
        .contains_user(owner, actor, ctx.plot_rank(PlotActivity::Claim))
    {
        return Err(ClaimError::NoPermission);
    }

    let id = ctx.store.allocate_id();
    let mut polygon = Polygon::new_child(id, None, &parent);
    ancestry.insert(parent);
    polygon.add_point(at, &ancestry)?;

    ctx.sessions
        .begin(actor, ClaimSession::new(polygon, ancestry, tick));
    Ok(())
}

fn execute_add_vertex(
    actor: UserId,
    at: GridPoint,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    let session = ctx.sessions.get(actor).ok_or(ClaimError::NotFound)?;
    let owner = ctx
        .policy()
        .effective_owner(session.polygon(), session.ancestry())
        .ok_or(ClaimError::Unknown)?;
    if !ctx
        .policy()
        .contains_user(&owner, actor, ctx.plot_rank(PlotActivity::Claim))
    {
        return Err(ClaimError::NoPermission);
    }
    ctx.sessions
        .get_mut(actor)
        .ok_or(ClaimError::NotFound)?
        .add_vertex(at)
}

fn execute_finish_claim(actor: UserId, ctx: &mut ClaimContext) -> Result<(), ClaimError> {
    let session = ctx.sessions.get(actor).ok_or(ClaimError::NotFound)?;
    if !session.is_complete() {
        return Err(ClaimError::BadAlignment);
    }
    if !session.is_valid_shape() {
        return Err(ClaimError::IntersectsBorder);
    }

    let polygon = ctx
        .sessions
        .end(actor)
        .ok_or(ClaimError::NotFound)?
        .into_polygon();
    info!(
        "{} claimed plot {} in {} ({} vertices, depth {})",
        actor,
        polygon.id(),
        polygon.world(),
        polygon.vertex_count(),
        polygon.depth()
    );
    ctx.store.save(polygon.to_record());
    Ok(())
}

fn execute_abort_claim(actor: UserId, ctx: &mut ClaimContext) -> Result<(), ClaimError> {
    ctx.sessions
        .end(actor)
        .map(|_| ())
        .ok_or(ClaimError::NotFound)
}

// ---------------------------------------------------------------------------
// Ownership transfer
// ---------------------------------------------------------------------------

fn execute_give_plot(
    actor: UserId,
    world: &WorldId,
    at: GridPoint,
    receiver: &PlotOwner,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    let resolved = resolve_at(&*ctx.store, ctx.config, world, at);
    let plot = resolved.plot();
    if plot.is_wilderness() {
        return Err(ClaimError::WrongUsage);
    }

    let policy = ctx.policy();
    let owner = policy
        .effective_owner(plot, resolved.ancestry())
        .ok_or(ClaimError::Unknown)?;
    if !policy.contains_user(&owner, actor, ctx.plot_rank(PlotActivity::Give)) {
        return Err(ClaimError::NoPermission);
    }
    match receiver {
        PlotOwner::Everyone => return Err(ClaimError::WrongUsage),
        PlotOwner::Group(name) if !ctx.groups.contains(name) => {
            return Err(ClaimError::NotFound);
        }
        _ => {}
    }

    let mut record = ctx.store.get(plot.id()).ok_or(ClaimError::NotFound)?;
    record.owner = Some(receiver.clone());
    info!(
        "plot {} in {} given to {} by {}",
        record.id, world, receiver, actor
    );
    ctx.store.save(record);
    Ok(())
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

fn execute_create_group(actor: UserId, name: &str, ctx: &mut ClaimContext) -> Result<(), ClaimError> {
    ctx.groups.create(name, actor)?;
    info!("{} founded group {}", actor, name.trim());
    Ok(())
}

/// Checks that `group` exists and that `actor` holds the rank configured
/// for `activity` inside it.
fn authorize_group(
    actor: UserId,
    group: &str,
    activity: GroupActivity,
    ctx: &ClaimContext,
) -> Result<(), ClaimError> {
    if !ctx.groups.contains(group) {
        return Err(ClaimError::NotFound);
    }
    let owner = PlotOwner::Group(group.to_string());
    if ctx
        .policy()
        .contains_user(&owner, actor, ctx.group_rank(activity))
    {
        Ok(())
    } else {
        Err(ClaimError::NoPermission)
    }
}

fn execute_add_member(
    actor: UserId,
    group: &str,
    user: UserId,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    authorize_group(actor, group, GroupActivity::Add, ctx)?;
    ctx.groups
        .get_mut(group)
        .ok_or(ClaimError::NotFound)?
        .add_member(user, Rank::Member)
}

fn execute_remove_member(
    actor: UserId,
    group: &str,
    user: UserId,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    authorize_group(actor, group, GroupActivity::Remove, ctx)?;
    ctx.groups
        .get_mut(group)
        .ok_or(ClaimError::NotFound)?
        .remove_member(user)
        .map(|_| ())
}

fn execute_rank_member(
    actor: UserId,
    group: &str,
    user: UserId,
    rank: Rank,
    ctx: &mut ClaimContext,
) -> Result<(), ClaimError> {
    authorize_group(actor, group, GroupActivity::Rank, ctx)?;
    ctx.groups
        .get_mut(group)
        .ok_or(ClaimError::NotFound)?
        .set_rank(user, rank)
}
