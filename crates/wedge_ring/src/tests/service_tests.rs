use super::*;
use std::{collections::HashSet, time::Duration};

fn policy(tick_ms: u64, max_wedges: usize, add_probability: f64) -> WalkPolicy {
    WalkPolicy::new(Duration::from_millis(tick_ms), max_wedges, add_probability).expect("policy")
}

fn drain(rx: &mut mpsc::UnboundedReceiver<RingEvent>) -> Vec<RingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn commands_emit_events_in_order() {
    let service = RingService::with_seed(WalkPolicy::default(), 11);
    let mut rx = service.subscribe().await;

    let first = service.add_random_wedge().await.expect("add first");
    let second = service.add_random_wedge().await.expect("add second");
    assert!(service.remove_wedge(first).await);
    assert!(!service.remove_wedge(first).await);
    assert_eq!(service.order().await, vec![second]);
    assert!(service.wedge(second).await.is_some());
    assert!(service.wedge(first).await.is_none());
    assert_eq!(service.reset().await, 1);
    assert!(service.is_empty().await);

    assert_eq!(
        drain(&mut rx),
        vec![
            RingEvent::WedgeAdded(first),
            RingEvent::WedgeAdded(second),
            RingEvent::WedgeRemoved(first),
            RingEvent::RingCleared,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn walk_ticks_on_interval_until_stopped() {
    let service = RingService::with_seed(policy(100, 50, 1.0), 3);
    let mut rx = service.subscribe().await;

    assert!(service.set_random_walk(true).await);
    assert_eq!(service.walk_state().await, WalkState::Walking);

    time::sleep(Duration::from_millis(350)).await;
    assert_eq!(service.len().await, 3);

    assert!(service.set_random_walk(false).await);
    assert_eq!(service.walk_state().await, WalkState::Idle);
    time::sleep(Duration::from_secs(5)).await;
    assert_eq!(service.len().await, 3);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 5);
    assert_eq!(events[0], RingEvent::RandomWalkToggled(true));
    assert!(events[1..4]
        .iter()
        .all(|event| matches!(event, RingEvent::WedgeAdded(_))));
    assert_eq!(events[4], RingEvent::RandomWalkToggled(false));
}

#[tokio::test(start_paused = true)]
async fn enabling_twice_runs_a_single_driver() {
    let service = RingService::with_seed(policy(100, 50, 1.0), 4);
    let mut rx = service.subscribe().await;

    assert!(service.set_random_walk(true).await);
    assert!(!service.set_random_walk(true).await);

    time::sleep(Duration::from_millis(150)).await;
    assert_eq!(service.len().await, 1);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], RingEvent::RandomWalkToggled(true));
    assert!(matches!(events[1], RingEvent::WedgeAdded(_)));
}

#[tokio::test(start_paused = true)]
async fn walk_respects_size_cap() {
    let service = RingService::with_seed(policy(10, 5, 0.9), 5);
    assert!(service.set_random_walk(true).await);

    for _ in 0..200 {
        time::sleep(Duration::from_millis(10)).await;
        assert!(service.len().await <= 5);
    }
    assert!(service.set_random_walk(false).await);
}

#[tokio::test(start_paused = true)]
async fn stale_tick_does_not_apply_after_stop() {
    let service = RingService::with_seed(policy(100, 50, 1.0), 6);
    assert!(service.set_random_walk(true).await);
    let stale = service.inner.lock().await.walk_epoch;

    assert!(service.set_random_walk(false).await);
    assert!(service.apply_walk_tick(stale).await.is_none());
    assert!(service.is_empty().await);

    assert!(service.set_random_walk(true).await);
    assert!(service.apply_walk_tick(stale).await.is_none());
    assert!(service.is_empty().await);

    let current = service.inner.lock().await.walk_epoch;
    let step = service
        .apply_walk_tick(current)
        .await
        .expect("current driver")
        .expect("step");
    assert!(matches!(step, WalkStep::Added(_)));
    assert_eq!(service.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_service_stops_driver() {
    let service = RingService::with_seed(policy(100, 50, 1.0), 7);
    let mut rx = service.subscribe().await;
    assert!(service.set_random_walk(true).await);
    drop(service);

    time::sleep(Duration::from_secs(1)).await;

    assert_eq!(rx.recv().await, Some(RingEvent::RandomWalkToggled(true)));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commands_keep_ring_consistent() {
    let service = RingService::with_seed(policy(1, 20, 0.5), 8);
    assert!(service.set_random_walk(true).await);

    let mut tasks = Vec::new();
    for worker in 0..4 {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            for i in 0..100 {
                match (worker + i) % 4 {
                    0 | 1 => {
                        service.add_random_wedge().await.expect("add");
                    }
                    2 => {
                        if let Some(id) = service.order().await.first().copied() {
                            service.remove_wedge(id).await;
                        }
                    }
                    _ => {
                        if i % 25 == 0 {
                            service.reset().await;
                        }
                    }
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.expect("worker");
    }
    assert!(service.set_random_walk(false).await);

    let guard = service.inner.lock().await;
    let order: HashSet<WedgeId> = guard.ring.order().iter().copied().collect();
    assert_eq!(order.len(), guard.ring.len());
    for id in &order {
        assert!(guard.ring.wedge(*id).is_some());
    }
    assert_eq!(guard.ring.snapshot().order().len(), order.len());
}
