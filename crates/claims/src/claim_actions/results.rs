use serde::{Deserialize, Serialize};

use plots::ClaimError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    Error(ClaimError),
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClaimOutcome::Success)
    }

    /// The refusal reason, if the action failed.
    pub fn error(&self) -> Option<ClaimError> {
        match self {
            ClaimOutcome::Error(e) => Some(*e),
            ClaimOutcome::Success => None,
        }
    }
}

impl From<Result<(), ClaimError>> for ClaimOutcome {
    fn from(result: Result<(), ClaimError>) -> Self {
        match result {
            Ok(()) => ClaimOutcome::Success,
            Err(e) => ClaimOutcome::Error(e),
        }
    }
}
