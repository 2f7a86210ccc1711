use std::collections::HashMap;

use rand::Rng;
use shared::{
    domain::{Wedge, WedgeId},
    error::RingError,
    protocol::{RingEvent, RingSnapshot},
};
use tokio::sync::mpsc;

use crate::{
    walk::{WalkPolicy, WalkState, WalkStep},
    wedge::random_wedge,
};

/// Ordered collection of wedges keyed by id.
///
/// `order` and `wedges` always hold the same id set. Every mutation that
/// changes observable state sends exactly one [`RingEvent`] to each
/// subscriber before returning.
#[derive(Debug, Default)]
pub struct Ring {
    wedges: HashMap<WedgeId, Wedge>,
    order: Vec<WedgeId>,
    walk: WalkState,
    subscribers: Vec<mpsc::UnboundedSender<RingEvent>>,
}

impl Ring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Events arrive in emission order and are never
    /// dropped while the receiver is alive.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RingEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn add_wedge(&mut self, wedge: Wedge) -> Result<WedgeId, RingError> {
        let id = wedge.id();
        if self.wedges.contains_key(&id) {
            return Err(RingError::DuplicateId(id));
        }
        self.wedges.insert(id, wedge);
        self.order.push(id);
        self.emit(RingEvent::WedgeAdded(id));
        Ok(id)
    }

    pub fn add_random_wedge<R: Rng>(&mut self, rng: &mut R) -> Result<WedgeId, RingError> {
        let wedge = random_wedge(rng, self.occupancy())?;
        self.add_wedge(wedge)
    }

    /// Removing an id that is not on the ring is a no-op and emits nothing.
    pub fn remove_wedge(&mut self, id: WedgeId) -> Option<Wedge> {
        let wedge = self.wedges.remove(&id)?;
        self.order.retain(|candidate| *candidate != id);
        self.emit(RingEvent::WedgeRemoved(id));
        Some(wedge)
    }

    /// Drops every wedge at once and emits a single `RingCleared`, even when
    /// the ring was already empty. Returns how many wedges were removed.
    pub fn reset(&mut self) -> usize {
        let removed = self.order.len();
        self.wedges.clear();
        self.order.clear();
        self.emit(RingEvent::RingCleared);
        removed
    }

    /// Returns whether the walk state actually changed.
    pub fn set_random_walk(&mut self, enabled: bool) -> bool {
        let next = if enabled {
            WalkState::Walking
        } else {
            WalkState::Idle
        };
        if self.walk == next {
            return false;
        }
        self.walk = next;
        self.emit(RingEvent::RandomWalkToggled(enabled));
        true
    }

    pub fn step_random_walk<R: Rng>(
        &mut self,
        rng: &mut R,
        policy: &WalkPolicy,
    ) -> Result<WalkStep, RingError> {
        let len = self.order.len();
        let add = if len == 0 {
            true
        } else if len >= policy.max_wedges() {
            false
        } else {
            rng.random_bool(policy.add_probability())
        };

        if add {
            return self.add_random_wedge(rng).map(WalkStep::Added);
        }

        let victim = self.order[rng.random_range(0..len)];
        self.remove_wedge(victim);
        Ok(WalkStep::Removed(victim))
    }

    pub fn order(&self) -> &[WedgeId] {
        &self.order
    }

    pub fn wedge(&self, id: WedgeId) -> Option<&Wedge> {
        self.wedges.get(&id)
    }

    /// Wedges in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Wedge> + '_ {
        self.order.iter().filter_map(|id| self.wedges.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: WedgeId) -> bool {
        self.wedges.contains_key(&id)
    }

    /// Fraction of one turn covered by wedge spans, clamped to `[0, 1]`.
    /// Overlapping spans are counted once per wedge.
    pub fn occupancy(&self) -> f64 {
        self.wedges.values().map(Wedge::span).sum::<f64>().min(1.0)
    }

    pub fn walk_state(&self) -> WalkState {
        self.walk
    }

    pub fn random_walk_enabled(&self) -> bool {
        self.walk.is_walking()
    }

    pub fn snapshot(&self) -> RingSnapshot {
        RingSnapshot {
            wedges: self.iter().cloned().collect(),
            random_walk_enabled: self.random_walk_enabled(),
        }
    }

    fn emit(&mut self, event: RingEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
#[path = "tests/ring_tests.rs"]
mod tests;
