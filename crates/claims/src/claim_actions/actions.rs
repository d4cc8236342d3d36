use serde::{Deserialize, Serialize};

use plots::{PlotOwner, Rank, UserId, WorldId};

/// A request against the claim layer. Coordinates are block positions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClaimAction {
    StartClaim {
        actor: UserId,
        world: WorldId,
        at: (i64, i64),
    },
    AddVertex {
        actor: UserId,
        at: (i64, i64),
    },
    FinishClaim {
        actor: UserId,
    },
    AbortClaim {
        actor: UserId,
    },
    GivePlot {
        actor: UserId,
        world: WorldId,
        at: (i64, i64),
        receiver: PlotOwner,
    },
    CreateGroup {
        actor: UserId,
        name: String,
    },
    AddMember {
        actor: UserId,
        group: String,
        user: UserId,
    },
    RemoveMember {
        actor: UserId,
        group: String,
        user: UserId,
    },
    RankMember {
        actor: UserId,
        group: String,
        user: UserId,
        rank: Rank,
    },
}

impl ClaimAction {
    /// The user on whose behalf the action runs.
    pub fn actor(&self) -> UserId {
        match self {
            ClaimAction::StartClaim { actor, .. }
            | ClaimAction::AddVertex { actor, .. }
            | ClaimAction::FinishClaim { actor }
            | ClaimAction::AbortClaim { actor }
            | ClaimAction::GivePlot { actor, .. }
            | ClaimAction::CreateGroup { actor, .. }
            | ClaimAction::AddMember { actor, .. }
            | ClaimAction::RemoveMember { actor, .. }
            | ClaimAction::RankMember { actor, .. } => *actor,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClaimAction::StartClaim { .. } => "start_claim",
            ClaimAction::AddVertex { .. } => "add_vertex",
            ClaimAction::FinishClaim { .. } => "finish_claim",
            ClaimAction::AbortClaim { .. } => "abort_claim",
            ClaimAction::GivePlot { .. } => "give_plot",
            ClaimAction::CreateGroup { .. } => "create_group",
            ClaimAction::AddMember { .. } => "add_member",
            ClaimAction::RemoveMember { .. } => "remove_member",
            ClaimAction::RankMember { .. } => "rank_member",
        }
    }
}
