use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Category, CategoryId};

/// Smallest allowed question count for a session.
pub const MIN_AMOUNT: i64 = 1;
/// Largest question count the question bank serves per request.
pub const MAX_AMOUNT: i64 = 50;
/// Default question count for a fresh configuration.
pub const DEFAULT_AMOUNT: i64 = 5;

/// Requested question difficulty. `Any` maps to the question bank's
/// unfiltered default and persists as an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    #[serde(rename = "")]
    Any,
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "hard")]
    Hard,
}

impl Difficulty {
    /// Query-string value for the question bank, `None` for `Any`.
    #[must_use]
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Difficulty::Any => None,
            Difficulty::Easy => Some("easy"),
            Difficulty::Medium => Some("medium"),
            Difficulty::Hard => Some("hard"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("question amount {amount} is outside {MIN_AMOUNT}..={MAX_AMOUNT}")]
    AmountOutOfRange { amount: i64 },

    #[error("category is not a numeric id: {raw:?}")]
    InvalidCategory { raw: String },
}

/// Unvalidated session configuration, in the exact shape persisted to the
/// settings key and filled in by the configuration form.
///
/// `category` holds a numeric category id or the empty string for "any".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettingsDraft {
    #[serde(default = "default_amount")]
    pub amount: i64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
}

fn default_amount() -> i64 {
    DEFAULT_AMOUNT
}

impl Default for QuizSettingsDraft {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT,
            difficulty: Difficulty::Any,
            category: String::new(),
        }
    }
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into settings a session may start from.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the amount is out of range or the
    /// category is neither empty nor a numeric id.
    pub fn validate(&self) -> Result<QuizSettings, QuizSettingsError> {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&self.amount) {
            return Err(QuizSettingsError::AmountOutOfRange {
                amount: self.amount,
            });
        }

        let category = self.category.trim();
        let category = if category.is_empty() {
            None
        } else {
            Some(
                category
                    .parse::<CategoryId>()
                    .map_err(|_| QuizSettingsError::InvalidCategory {
                        raw: self.category.clone(),
                    })?,
            )
        };

        Ok(QuizSettings {
            amount: self.amount as u8,
            difficulty: self.difficulty,
            category,
        })
    }

    /// Drop a persisted category that no longer exists in the fetched
    /// category list, falling back to "any category".
    pub fn reconcile_category(&mut self, categories: &[Category]) {
        if self.category.trim().is_empty() {
            return;
        }
        let exists = categories
            .iter()
            .any(|category| category.id.to_string() == self.category.trim());
        if !exists {
            self.category.clear();
        }
    }
}

/// Validated session configuration; holding one authorizes a session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    amount: u8,
    difficulty: Difficulty,
    category: Option<CategoryId>,
}

impl QuizSettings {
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

    /// Back to the persisted draft shape.
    #[must_use]
    pub fn to_draft(&self) -> QuizSettingsDraft {
        QuizSettingsDraft {
            amount: i64::from(self.amount),
            difficulty: self.difficulty,
            category: self
                .category
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT as u8,
            difficulty: Difficulty::Any,
            category: None,
        }
    }
}
