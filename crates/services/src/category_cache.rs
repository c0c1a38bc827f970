use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use quiz_core::Clock;
use quiz_core::model::{CATEGORY_TTL_MS, CachedCategories, Category};
use storage::repository::{KeyValueStore, keys};

use crate::access_gate::AccessGate;
use crate::client::QuestionBankClient;
use crate::error::TransportError;

/// Time-to-live cache over the category list.
///
/// Reads and writes are best-effort: a missing, stale, or malformed cache
/// entry means a refetch, and a failed write never fails the call.
#[derive(Clone)]
pub struct CategoryCache {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl CategoryCache {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store,
            ttl: Duration::milliseconds(CATEGORY_TTL_MS),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached category list while fresh; otherwise acquire the
    /// gate, fetch, cache, and return the fresh list.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if a refetch is needed and fails.
    pub async fn get(
        &self,
        gate: &AccessGate,
        client: &dyn QuestionBankClient,
    ) -> Result<Vec<Category>, TransportError> {
        if let Some(cached) = self.load_fresh().await {
            return Ok(cached);
        }

        gate.acquire().await;
        let categories = client.fetch_category_list().await?;
        self.store_categories(&categories).await;
        Ok(categories)
    }

    async fn load_fresh(&self) -> Option<Vec<Category>> {
        let bytes = match self.store.get(keys::CATEGORIES).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                debug!("category cache unavailable, refetching: {err}");
                return None;
            }
        };

        let cached: CachedCategories = serde_json::from_slice(&bytes).ok()?;
        cached
            .is_fresh(self.clock.now(), self.ttl)
            .then_some(cached.data)
    }

    async fn store_categories(&self, categories: &[Category]) {
        let cached = CachedCategories::new(self.clock.now(), categories.to_vec());
        match serde_json::to_vec(&cached) {
            Ok(bytes) => {
                if let Err(err) = self.store.put(keys::CATEGORIES, &bytes).await {
                    warn!("failed to cache category list: {err}");
                }
            }
            Err(err) => warn!("failed to encode category list for caching: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::model::CategoryId;
    use quiz_core::time::manual_clock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::InMemoryStore;

    struct CountingClient {
        calls: AtomicUsize,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuestionBankClient for CountingClient {
        async fn fetch_question_set(
            &self,
            _query: &crate::client::QuestionQuery,
        ) -> Result<quiz_core::model::RawQuestionSet, TransportError> {
            unimplemented!("not used by category tests")
        }

        async fn fetch_category_list(&self) -> Result<Vec<Category>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Category {
                id: CategoryId::new(9),
                name: "General Knowledge".into(),
            }])
        }
    }

    fn setup() -> (Clock, AccessGate, CategoryCache, CountingClient) {
        let clock = manual_clock();
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let gate = AccessGate::new(clock.clone(), store.clone());
        let cache = CategoryCache::new(clock.clone(), store);
        (clock, gate, cache, CountingClient::new())
    }

    #[tokio::test]
    async fn fresh_cache_makes_zero_network_calls() {
        let (_clock, gate, cache, client) = setup();

        let first = cache.get(&gate, &client).await.unwrap();
        assert_eq!(client.calls(), 1);

        let second = cache.get(&gate, &client).await.unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_cache_makes_exactly_one_call() {
        let (clock, gate, cache, client) = setup();

        cache.get(&gate, &client).await.unwrap();
        clock.advance(cache.ttl() + Duration::seconds(1));

        cache.get(&gate, &client).await.unwrap();
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn cache_within_ttl_boundary_still_counts_as_fresh() {
        let (clock, gate, cache, client) = setup();

        cache.get(&gate, &client).await.unwrap();
        clock.advance(cache.ttl() - Duration::seconds(1));

        cache.get(&gate, &client).await.unwrap();
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_cache_entry_refetches() {
        let (_clock, gate, cache, client) = setup();
        cache
            .store
            .put(keys::CATEGORIES, b"{not json")
            .await
            .unwrap();

        let categories = cache.get(&gate, &client).await.unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(categories.len(), 1);
    }

    #[tokio::test]
    async fn refetch_respects_the_gate_cooldown() {
        let (clock, gate, cache, client) = setup();

        gate.acquire().await;
        let floor = clock.now();

        cache.get(&gate, &client).await.unwrap();
        assert!(clock.now() - floor >= gate.cooldown());
    }
}
