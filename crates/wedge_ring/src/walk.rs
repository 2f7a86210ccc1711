use std::time::Duration;

use shared::{domain::WedgeId, error::RingError};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_WEDGES: usize = 50;
pub const DEFAULT_ADD_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkState {
    #[default]
    Idle,
    Walking,
}

impl WalkState {
    pub fn is_walking(self) -> bool {
        self == Self::Walking
    }
}

/// Outcome of one random walk tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    Added(WedgeId),
    Removed(WedgeId),
}

/// Parameters of the periodic perturbation loop.
///
/// Each tick adds a wedge when the ring is empty, removes one when the ring
/// holds `max_wedges` or more, and otherwise adds with `add_probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkPolicy {
    tick_interval: Duration,
    max_wedges: usize,
    add_probability: f64,
}

impl WalkPolicy {
    pub fn new(
        tick_interval: Duration,
        max_wedges: usize,
        add_probability: f64,
    ) -> Result<Self, RingError> {
        if tick_interval.is_zero() {
            return Err(RingError::invalid_walk_policy("tick interval must be non-zero"));
        }
        if max_wedges == 0 {
            return Err(RingError::invalid_walk_policy("max wedges must be at least 1"));
        }
        if !(0.0..=1.0).contains(&add_probability) {
            return Err(RingError::invalid_walk_policy(format!(
                "add probability {add_probability} outside [0, 1]"
            )));
        }
        Ok(Self {
            tick_interval,
            max_wedges,
            add_probability,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn max_wedges(&self) -> usize {
        self.max_wedges
    }

    pub fn add_probability(&self) -> f64 {
        self.add_probability
    }
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_wedges: DEFAULT_MAX_WEDGES,
            add_probability: DEFAULT_ADD_PROBABILITY,
        }
    }
}
