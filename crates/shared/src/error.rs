use thiserror::Error;

use crate::domain::WedgeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Degenerate or out-of-range wedge bounds. Retrying with the same inputs
    /// always fails.
    #[error("invalid wedge geometry: {reason}")]
    InvalidGeometry { reason: String },
    /// Id collision on insert. Unreachable with `WedgeId::next`.
    #[error("wedge {0} is already on the ring")]
    DuplicateId(WedgeId),
    #[error("invalid random walk policy: {reason}")]
    InvalidWalkPolicy { reason: String },
}

impl RingError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn invalid_walk_policy(reason: impl Into<String>) -> Self {
        Self::InvalidWalkPolicy {
            reason: reason.into(),
        }
    }
}
