use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use quiz_core::model::{Category, CategoryId, Difficulty, QuizSettings, RawQuestionSet};

use crate::error::TransportError;

/// Question endpoint of the Open Trivia Database.
pub const QUESTIONS_URL: &str = "https://opentdb.com/api.php";
/// Category endpoint of the Open Trivia Database.
pub const CATEGORIES_URL: &str = "https://opentdb.com/api_category.php";

/// Parameters for one question-set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionQuery {
    amount: u8,
    difficulty: Difficulty,
    category: Option<CategoryId>,
}

impl QuestionQuery {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            amount: settings.amount(),
            difficulty: settings.difficulty(),
            category: settings.category(),
        }
    }

    #[must_use]
    pub fn amount(&self) -> u8 {
        self.amount
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    /// Query-string pairs; "any" difficulty and "any" category are omitted
    /// rather than sent empty.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("amount", self.amount.to_string())];
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.difficulty.as_param() {
            params.push(("difficulty", difficulty.to_owned()));
        }
        params
    }
}

/// The "fetch JSON" transport seam to the question bank. Implementations
/// issue one outbound request per call; throttling and caching live a
/// layer above.
#[async_trait]
pub trait QuestionBankClient: Send + Sync {
    /// Fetch a raw question set.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on a failed request or non-success status.
    async fn fetch_question_set(&self, query: &QuestionQuery)
    -> Result<RawQuestionSet, TransportError>;

    /// Fetch and normalize the category list.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on a failed request or non-success status.
    async fn fetch_category_list(&self) -> Result<Vec<Category>, TransportError>;
}

/// `reqwest`-backed client for the Open Trivia Database.
#[derive(Clone)]
pub struct OpenTdbClient {
    client: Client,
    questions_url: String,
    categories_url: String,
}

impl OpenTdbClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_urls(QUESTIONS_URL, CATEGORIES_URL)
    }

    /// Point the client at alternative endpoints (test servers).
    #[must_use]
    pub fn with_base_urls(
        questions_url: impl Into<String>,
        categories_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            questions_url: questions_url.into(),
            categories_url: categories_url.into(),
        }
    }
}

impl Default for OpenTdbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionBankClient for OpenTdbClient {
    async fn fetch_question_set(
        &self,
        query: &QuestionQuery,
    ) -> Result<RawQuestionSet, TransportError> {
        let response = self
            .client
            .get(&self.questions_url)
            .query(&query.to_params())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        Ok(response.json::<RawQuestionSet>().await?)
    }

    async fn fetch_category_list(&self) -> Result<Vec<Category>, TransportError> {
        let response = self.client.get(&self.categories_url).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        let payload = response.json::<Value>().await?;
        Ok(normalize_categories(&payload))
    }
}

/// Normalize the category payload to `{id, name}` pairs.
///
/// A malformed or missing `trivia_categories` list yields an empty list
/// rather than an error; entries without a usable id or name are skipped.
#[must_use]
pub fn normalize_categories(payload: &Value) -> Vec<Category> {
    let Some(entries) = payload.get("trivia_categories").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = entry
                .get("id")
                .and_then(Value::as_u64)
                .and_then(|id| u32::try_from(id).ok())?;
            let name = entry.get("name").and_then(Value::as_str)?;
            Some(Category {
                id: CategoryId::new(id),
                name: name.to_owned(),
            })
        })
        .collect()
}
