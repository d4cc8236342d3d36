use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a geometry edit or a claim-session action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimError {
    /// The edge to the new vertex is neither axis-parallel nor diagonal,
    /// or it leaves the parent plot.
    BadAlignment,
    /// The edge crosses or overlaps an existing border.
    IntersectsBorder,
    NotFound,
    AlreadyPresent,
    NotPresent,
    NoPermission,
    WrongUsage,
    Unknown,
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimError::BadAlignment => {
                write!(f, "edge must be axis-parallel or diagonal and stay inside the parent plot")
            }
            ClaimError::IntersectsBorder => write!(f, "edge crosses an existing border"),
            ClaimError::NotFound => write!(f, "not found"),
            ClaimError::AlreadyPresent => write!(f, "already present"),
            ClaimError::NotPresent => write!(f, "not present"),
            ClaimError::NoPermission => write!(f, "permission denied"),
            ClaimError::WrongUsage => write!(f, "wrong usage"),
            ClaimError::Unknown => write!(f, "unknown error"),
        }
    }
}

impl std::error::Error for ClaimError {}
