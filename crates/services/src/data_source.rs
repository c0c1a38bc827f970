use std::sync::Arc;

use chrono::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use quiz_core::Clock;
use quiz_core::model::{CATEGORY_TTL_MS, Category, RawQuestionSet};
use storage::repository::KeyValueStore;

use crate::access_gate::{AccessGate, COOLDOWN_MS};
use crate::category_cache::CategoryCache;
use crate::client::{QuestionBankClient, QuestionQuery};
use crate::error::TransportError;

/// Non-error completion of a fetch: either data, or "the caller walked
/// away". `Cancelled` must not be treated as an error and implies no state
/// was touched on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Cancelled,
}

impl<T> FetchOutcome<T> {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchOutcome::Cancelled)
    }

    /// The fetched value, if the fetch ran to completion.
    #[must_use]
    pub fn fetched(self) -> Option<T> {
        match self {
            FetchOutcome::Fetched(value) => Some(value),
            FetchOutcome::Cancelled => None,
        }
    }
}

/// Tunables for the access-controlled data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSourceConfig {
    pub cooldown_ms: i64,
    pub category_ttl_ms: i64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: COOLDOWN_MS,
            category_ttl_ms: CATEGORY_TTL_MS,
        }
    }
}

/// All access to the question bank goes through here: question fetches wait
/// on the shared cooldown gate, category fetches additionally consult the
/// TTL cache.
#[derive(Clone)]
pub struct DataSource {
    gate: AccessGate,
    cache: CategoryCache,
    client: Arc<dyn QuestionBankClient>,
}

impl DataSource {
    #[must_use]
    pub fn new(
        clock: Clock,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn QuestionBankClient>,
    ) -> Self {
        Self::with_config(clock, store, client, DataSourceConfig::default())
    }

    #[must_use]
    pub fn with_config(
        clock: Clock,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn QuestionBankClient>,
        config: DataSourceConfig,
    ) -> Self {
        let gate = AccessGate::new(clock.clone(), store.clone())
            .with_cooldown(Duration::milliseconds(config.cooldown_ms));
        let cache = CategoryCache::new(clock, store)
            .with_ttl(Duration::milliseconds(config.category_ttl_ms));
        Self {
            gate,
            cache,
            client,
        }
    }

    /// Fetch a raw question set, honoring the cooldown.
    ///
    /// Cancelling aborts the in-flight request (cooldown wait included) and
    /// resolves to `FetchOutcome::Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request completes with a failure.
    pub async fn fetch_questions(
        &self,
        query: &QuestionQuery,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<RawQuestionSet>, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("question fetch cancelled");
                Ok(FetchOutcome::Cancelled)
            }
            result = self.query_questions(query) => result.map(FetchOutcome::Fetched),
        }
    }

    async fn query_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<RawQuestionSet, TransportError> {
        self.gate.acquire().await;
        self.client.fetch_question_set(query).await
    }

    /// Fetch the category list through the TTL cache, same cancellation
    /// contract as question fetches.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if a refetch is needed and fails.
    pub async fn fetch_categories(
        &self,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<Vec<Category>>, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("category fetch cancelled");
                Ok(FetchOutcome::Cancelled)
            }
            result = self.cache.get(&self.gate, self.client.as_ref()) => {
                result.map(FetchOutcome::Fetched)
            }
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

    struct StubClient {
        calls: AtomicUsize,
        hang: bool,
    }

    impl StubClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                hang: false,
            }
        }

        fn hanging() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                hang: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuestionBankClient for StubClient {
        async fn fetch_question_set(
            &self,
            _query: &QuestionQuery,
        ) -> Result<RawQuestionSet, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending().await
            } else {
                Ok(RawQuestionSet::default())
            }
        }

        async fn fetch_category_list(&self) -> Result<Vec<Category>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending().await
            } else {
                Ok(vec![Category {
                    id: CategoryId::new(9),
                    name: "General Knowledge".into(),
                }])
            }
        }
    }

    fn source_over(client: Arc<StubClient>) -> (Clock, DataSource) {
        let clock = manual_clock();
        let store = Arc::new(InMemoryStore::new());
        (clock.clone(), DataSource::new(clock, store, client))
    }

    #[tokio::test]
    async fn categories_come_from_the_cache_while_fresh() {
        let client = Arc::new(StubClient::new());
        let (_clock, source) = source_over(client.clone());
        let cancel = CancellationToken::new();

        let first = source.fetch_categories(&cancel).await.unwrap();
        assert!(!first.is_cancelled());
        assert_eq!(client.calls(), 1);

        let second = source.fetch_categories(&cancel).await.unwrap();
        assert_eq!(client.calls(), 1);
        assert_eq!(second.fetched(), first.fetched());
    }

    #[tokio::test]
    async fn expired_categories_are_refetched() {
        let client = Arc::new(StubClient::new());
        let (clock, source) = source_over(client.clone());
        let cancel = CancellationToken::new();

        source.fetch_categories(&cancel).await.unwrap();
        clock.advance(Duration::milliseconds(CATEGORY_TTL_MS + 1));

        let outcome = source.fetch_categories(&cancel).await.unwrap();
        assert_eq!(client.calls(), 2);
        assert_eq!(outcome.fetched().map(|list| list.len()), Some(1));
    }

    #[tokio::test]
    async fn cancelling_a_category_fetch_is_not_an_error() {
        let client = Arc::new(StubClient::hanging());
        let (_clock, source) = source_over(client);
        let cancel = CancellationToken::new();

        let source_task = source.clone();
        let token = cancel.clone();
        let handle =
            tokio::spawn(async move { source_task.fetch_categories(&token).await });

        tokio::task::yield_now().await;
        cancel.cancel();

        let outcome = handle
            .await
            .expect("fetch task should not panic")
            .expect("cancellation should not surface as an error");
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.fetched(), None);
    }

    #[tokio::test]
    async fn cancelling_a_question_fetch_is_not_an_error() {
        let client = Arc::new(StubClient::hanging());
        let (_clock, source) = source_over(client.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let query = QuestionQuery::from_settings(&quiz_core::model::QuizSettings::default());
        let outcome = source.fetch_questions(&query, &cancel).await.unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(client.calls(), 0);
    }
}
