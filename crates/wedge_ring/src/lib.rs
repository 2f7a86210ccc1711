use std::sync::{Arc, Weak};

use rand::{rngs::SmallRng, SeedableRng};
use shared::{
    domain::{Wedge, WedgeId},
    error::RingError,
    protocol::{RingEvent, RingSnapshot},
};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub mod ring;
pub mod walk;
pub mod wedge;

pub use ring::Ring;
pub use walk::{WalkPolicy, WalkState, WalkStep};

/// Shared handle to one [`Ring`] plus its random walk driver.
///
/// User commands and driver ticks all go through the same lock, so every
/// operation observes and leaves a consistent ring.
pub struct RingService {
    policy: WalkPolicy,
    inner: Mutex<RingServiceState>,
}

struct RingServiceState {
    ring: Ring,
    rng: SmallRng,
    walk_epoch: u64,
    driver: Option<JoinHandle<()>>,
}

impl RingService {
    pub fn new(policy: WalkPolicy) -> Arc<Self> {
        Self::with_rng(policy, SmallRng::from_os_rng())
    }

    pub fn with_seed(policy: WalkPolicy, seed: u64) -> Arc<Self> {
        Self::with_rng(policy, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(policy: WalkPolicy, rng: SmallRng) -> Arc<Self> {
        Arc::new(Self {
            policy,
            inner: Mutex::new(RingServiceState {
                ring: Ring::new(),
                rng,
                walk_epoch: 0,
                driver: None,
            }),
        })
    }

    pub fn policy(&self) -> &WalkPolicy {
        &self.policy
    }

    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<RingEvent> {
        self.inner.lock().await.ring.subscribe()
    }

    pub async fn add_random_wedge(&self) -> Result<WedgeId, RingError> {
        let mut guard = self.inner.lock().await;
        let RingServiceState { ring, rng, .. } = &mut *guard;
        let id = ring.add_random_wedge(rng)?;
        info!(wedge_id = id.0, len = ring.len(), "ring: wedge added");
        Ok(id)
    }

    /// Returns whether a wedge was removed. Unknown ids are ignored.
    pub async fn remove_wedge(&self, id: WedgeId) -> bool {
        let mut guard = self.inner.lock().await;
        let removed = guard.ring.remove_wedge(id).is_some();
        if removed {
            info!(wedge_id = id.0, len = guard.ring.len(), "ring: wedge removed");
        } else {
            debug!(wedge_id = id.0, "ring: ignoring removal of unknown wedge");
        }
        removed
    }

    pub async fn reset(&self) -> usize {
        let removed = self.inner.lock().await.ring.reset();
        info!(removed, "ring: cleared");
        removed
    }

    /// Starts or stops the random walk. Returns whether the state changed;
    /// repeating the current state leaves the running driver untouched.
    pub async fn set_random_walk(self: &Arc<Self>, enabled: bool) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.ring.set_random_walk(enabled) {
            return false;
        }

        guard.walk_epoch += 1;
        if let Some(driver) = guard.driver.take() {
            driver.abort();
        }
        if enabled {
            guard.driver = Some(self.spawn_walk_driver(guard.walk_epoch));
        }

        info!(
            enabled,
            epoch = guard.walk_epoch,
            tick_ms = self.policy.tick_interval().as_millis() as u64,
            "ring: random walk toggled"
        );
        true
    }

    pub async fn walk_state(&self) -> WalkState {
        self.inner.lock().await.ring.walk_state()
    }

    pub async fn snapshot(&self) -> RingSnapshot {
        self.inner.lock().await.ring.snapshot()
    }

    pub async fn order(&self) -> Vec<WedgeId> {
        self.inner.lock().await.ring.order().to_vec()
    }

    pub async fn wedge(&self, id: WedgeId) -> Option<Wedge> {
        self.inner.lock().await.ring.wedge(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.ring.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.ring.is_empty()
    }

    fn spawn_walk_driver(self: &Arc<Self>, epoch: u64) -> JoinHandle<()> {
        let service: Weak<Self> = Arc::downgrade(self);
        let period = self.policy.tick_interval();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(service) = service.upgrade() else {
                    break;
                };
                if service.apply_walk_tick(epoch).await.is_none() {
                    break;
                }
            }
            debug!(epoch, "ring: random walk driver exited");
        })
    }

    /// Applies one tick on behalf of the driver started at `epoch`.
    ///
    /// Returns `None` once that driver has been superseded or stopped, in
    /// which case the ring is left untouched.
    pub(crate) async fn apply_walk_tick(&self, epoch: u64) -> Option<Result<WalkStep, RingError>> {
        let mut guard = self.inner.lock().await;
        if guard.walk_epoch != epoch || !guard.ring.random_walk_enabled() {
            return None;
        }

        let RingServiceState { ring, rng, .. } = &mut *guard;
        let result = ring.step_random_walk(rng, &self.policy);
        match &result {
            Ok(WalkStep::Added(id)) => {
                debug!(wedge_id = id.0, len = ring.len(), "ring: walk added wedge")
            }
            Ok(WalkStep::Removed(id)) => {
                debug!(wedge_id = id.0, len = ring.len(), "ring: walk removed wedge")
            }
            Err(err) => warn!("ring: random walk step failed: {err}"),
        }
        Some(result)
    }
}

impl Drop for RingService {
    fn drop(&mut self) {
        if let Some(driver) = self.inner.get_mut().driver.take() {
            driver.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
