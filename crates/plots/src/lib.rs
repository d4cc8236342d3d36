//! Nested land-claim plots on a block grid.
//!
//! Polygons are built vertex by vertex under grid-alignment and
//! non-intersection rules, nest inside one another down from a per-world
//! wilderness, and carry owners (users, groups or everyone) whose ranks
//! decide what other users may do inside.

pub mod config;
pub mod error;
pub mod grid_point;
pub mod groups;
pub mod hierarchy;
pub mod owner;
pub mod ownership;
pub mod polygon;
pub mod save;
pub mod segment;
pub mod store;
pub mod vertex_codec;

pub use config::{ClaimsConfig, GroupActivity, PlotActivity, RankRequirements};
pub use error::ClaimError;
pub use grid_point::GridPoint;
pub use groups::{Group, GroupDirectory, Rank};
pub use hierarchy::{
    entered_plots, NoAncestry, PlotArena, PlotHierarchyResolver, PlotLookup, ResolvedPlot,
};
pub use owner::{PlotOwner, UserId, WorldId};
pub use ownership::{effective_owner, CapabilityGrants, CapabilityProvider, OwnershipPolicy};
pub use polygon::{BoundingBox, PlotId, Polygon, WILDERNESS_ID};
pub use save::{decode_snapshot, Saveable, SaveableAppExt, SaveableRegistry};
pub use segment::Segment;
pub use store::{MemoryPlotStore, PlotRecord, PlotStore};
pub use vertex_codec::{parse_vertices, serialize_vertices, VertexParseError};
