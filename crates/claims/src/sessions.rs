//! In-progress claims, one per acting user.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use plots::{ClaimError, GridPoint, PlotArena, Polygon, Segment, UserId};

/// A polygon being drawn vertex by vertex, together with the ancestors it
/// is validated against.
#[derive(Debug, Clone)]
pub struct ClaimSession {
    polygon: Polygon,
    ancestry: PlotArena,
    started_tick: u64,
}

impl ClaimSession {
    /// `ancestry` must hold the polygon's parent and the parent's own chain.
    pub fn new(polygon: Polygon, ancestry: PlotArena, started_tick: u64) -> Self {
        Self {
            polygon,
            ancestry,
            started_tick,
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn ancestry(&self) -> &PlotArena {
        &self.ancestry
    }

    pub fn started_tick(&self) -> u64 {
        self.started_tick
    }

    /// The plot this claim is carved from.
    pub fn parent(&self) -> Option<&Polygon> {
        self.ancestry.get(self.polygon.parent()?)
    }

    pub fn add_vertex(&mut self, at: GridPoint) -> Result<(), ClaimError> {
        self.polygon.add_point(at, &self.ancestry)
    }

    pub fn is_complete(&self) -> bool {
        self.polygon.is_complete(&self.ancestry)
    }

    pub fn is_valid_shape(&self) -> bool {
        self.polygon.is_valid_shape(&self.ancestry)
    }

    /// Unit block faces of the outline drawn so far.
    pub fn outline(&self) -> &HashSet<Segment> {
        self.polygon.border_raster()
    }

    pub fn into_polygon(self) -> Polygon {
        self.polygon
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ClaimSessions {
    sessions: HashMap<UserId, ClaimSession>,
}

impl ClaimSessions {
    /// Start a session for `actor`, returning any session it replaces.
    pub fn begin(&mut self, actor: UserId, session: ClaimSession) -> Option<ClaimSession> {
        self.sessions.insert(actor, session)
    }

    pub fn get(&self, actor: UserId) -> Option<&ClaimSession> {
        self.sessions.get(&actor)
    }

    pub fn get_mut(&mut self, actor: UserId) -> Option<&mut ClaimSession> {
        self.sessions.get_mut(&actor)
    }

    pub fn end(&mut self, actor: UserId) -> Option<ClaimSession> {
        self.sessions.remove(&actor)
    }

    pub fn contains(&self, actor: UserId) -> bool {
        self.sessions.contains_key(&actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, &ClaimSession)> {
        self.sessions.iter().map(|(actor, session)| (*actor, session))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
