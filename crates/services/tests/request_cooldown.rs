//! Cooldown behavior when callers overlap on a multi-threaded runtime.

use std::sync::Arc;

use chrono::Duration;

use quiz_core::time::manual_clock;
use services::access_gate::AccessGate;
use storage::repository::{InMemoryStore, KeyValueStore, keys};

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_callers_are_spaced_by_the_cooldown() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryStore::new());
    let gate = AccessGate::new(clock.clone(), store.clone());
    let start = clock.now();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let gate = gate.clone();
        handles.push(tokio::spawn(async move {
            gate.acquire().await;
        }));
    }
    for handle in handles {
        handle.await.expect("caller should not panic");
    }

    // The first grant is immediate; each of the other three waits out a
    // full cooldown behind its predecessor.
    let elapsed = clock.now() - start;
    assert_eq!(elapsed, Duration::seconds(15));

    let recorded = store
        .get(keys::LAST_REQUEST_AT)
        .await
        .expect("store should be readable")
        .expect("a grant should have been recorded");
    let recorded = String::from_utf8(recorded).expect("timestamp should be ASCII");
    assert_eq!(
        recorded.parse::<i64>().ok(),
        Some(clock.now().timestamp_millis())
    );
}

#[tokio::test]
async fn first_caller_is_granted_immediately() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryStore::new());
    let gate = AccessGate::new(clock.clone(), store);
    let start = clock.now();

    gate.acquire().await;

    assert_eq!(clock.now(), start);
}
