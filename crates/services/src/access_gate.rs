use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use quiz_core::Clock;
use storage::repository::{KeyValueStore, keys};

/// Minimum spacing between outbound question-bank requests (the bank
/// rate-limits to one request per five seconds).
pub const COOLDOWN_MS: i64 = 5_000;

/// Coordinates the request cooldown across all callers.
///
/// The last-request timestamp lives in shared storage so independent
/// processes over the same backend honor the same floor. Storage failures
/// fail open: no cooldown memory means no wait.
#[derive(Clone)]
pub struct AccessGate {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    cooldown: Duration,
    // Serializes read-wait-record so overlapping callers queue up behind
    // the recorded floor instead of racing past it together.
    slot: Arc<Mutex<()>>,
}

impl AccessGate {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store,
            cooldown: Duration::milliseconds(COOLDOWN_MS),
            slot: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Resolve once it is safe to issue a request.
    ///
    /// Suspends until the cooldown window since the last recorded request
    /// has elapsed, then records "now" as the new floor before returning.
    pub async fn acquire(&self) {
        let _slot = self.slot.lock().await;

        if let Some(last_request_at) = self.last_request_at().await {
            let elapsed = self.clock.now() - last_request_at;
            let wait = self.cooldown - elapsed;
            if wait > Duration::zero() {
                self.wait(wait).await;
            }
        }

        self.record_request().await;
    }

    async fn wait(&self, delta: Duration) {
        match &self.clock {
            Clock::Default => {
                if let Ok(delay) = delta.to_std() {
                    tokio::time::sleep(delay).await;
                }
            }
            // A manual clock has nothing to sleep on; jump it forward so
            // fake-time callers observe the same spacing.
            Clock::Manual(_) => self.clock.advance(delta),
        }
    }

    async fn last_request_at(&self) -> Option<DateTime<Utc>> {
        match self.store.get(keys::LAST_REQUEST_AT).await {
            Ok(Some(bytes)) => parse_millis(&bytes),
            Ok(None) => None,
            Err(err) => {
                debug!("cooldown timestamp unavailable, proceeding without wait: {err}");
                None
            }
        }
    }

    async fn record_request(&self) {
        let millis = self.clock.now().timestamp_millis().to_string();
        if let Err(err) = self
            .store
            .put(keys::LAST_REQUEST_AT, millis.as_bytes())
            .await
        {
            warn!("failed to persist cooldown timestamp: {err}");
        }
    }
}

fn parse_millis(bytes: &[u8]) -> Option<DateTime<Utc>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let millis = text.trim().parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}
