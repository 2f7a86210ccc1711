use serde::{Deserialize, Serialize};

use crate::domain::{Wedge, WedgeId};

/// State transition published by the ring to its observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RingEvent {
    WedgeAdded(WedgeId),
    WedgeRemoved(WedgeId),
    RingCleared,
    RandomWalkToggled(bool),
}

impl RingEvent {
    pub fn wedge_id(&self) -> Option<WedgeId> {
        match self {
            Self::WedgeAdded(id) | Self::WedgeRemoved(id) => Some(*id),
            Self::RingCleared | Self::RandomWalkToggled(_) => None,
        }
    }
}

/// Read model handed to observers: wedges in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingSnapshot {
    pub wedges: Vec<Wedge>,
    pub random_walk_enabled: bool,
}

impl RingSnapshot {
    pub fn order(&self) -> Vec<WedgeId> {
        self.wedges.iter().map(Wedge::id).collect()
    }
}
