use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime for a cached category list (24 hours).
pub const CATEGORY_TTL_MS: i64 = 24 * 60 * 60 * 1_000;

/// Unique identifier for a question-bank category.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(u32);

impl CategoryId {
    /// Creates a new `CategoryId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `CategoryId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryIdError;

impl fmt::Display for ParseCategoryIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse CategoryId from string")
    }
}

impl std::error::Error for ParseCategoryIdError {}

impl FromStr for CategoryId {
    type Err = ParseCategoryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(CategoryId::new)
            .map_err(|_| ParseCategoryIdError)
    }
}

/// One selectable question category, normalized from the question bank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Persisted category list together with its fetch timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCategories {
    pub fetched_at: DateTime<Utc>,
    pub data: Vec<Category>,
}

impl CachedCategories {
    #[must_use]
    pub fn new(fetched_at: DateTime<Utc>, data: Vec<Category>) -> Self {
        Self { fetched_at, data }
    }

    /// A cache entry is valid only while `now - fetched_at < ttl`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}
