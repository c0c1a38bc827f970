use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Answer, AnswerId, Question};

/// Per-question snapshot taken once, when a session completes: the question,
/// its shuffled answers, the correct id, and whatever the player picked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub question: String,
    pub answers: Vec<Answer>,
    pub correct_answer_id: AnswerId,
    pub selected_answer_id: Option<AnswerId>,
}

impl ReviewEntry {
    /// Zip a question with its selection slot.
    #[must_use]
    pub fn from_question(question: &Question, selected: Option<AnswerId>) -> Self {
        Self {
            question: question.text().to_owned(),
            answers: question.answers().to_vec(),
            correct_answer_id: question.correct_answer_id().clone(),
            selected_answer_id: selected,
        }
    }

    /// True when the player picked the correct answer.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected_answer_id.as_ref() == Some(&self.correct_answer_id)
    }

    /// Display label of the selected answer, if any.
    #[must_use]
    pub fn selected_label(&self) -> Option<&str> {
        let selected = self.selected_answer_id.as_ref()?;
        self.answers
            .iter()
            .find(|answer| &answer.id == selected)
            .map(|answer| answer.label.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("score {score} exceeds total {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("review length {len} does not match total {total}")]
    ReviewLengthMismatch { total: u32, len: usize },
}

/// Final record of a completed session. Built exactly once per run; a new
/// session start discards the previous result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    score: u32,
    total: u32,
    review: Vec<ReviewEntry>,
}

impl QuizResult {
    /// Assemble a result, verifying score and review-length invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` if `score > total` or the review does not
    /// hold one entry per question.
    pub fn new(score: u32, total: u32, review: Vec<ReviewEntry>) -> Result<Self, QuizResultError> {
        if score > total {
            return Err(QuizResultError::ScoreExceedsTotal { score, total });
        }
        let len = review.len();
        if len != total as usize {
            return Err(QuizResultError::ReviewLengthMismatch { total, len });
        }

        Ok(Self {
            score,
            total,
            review,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn review(&self) -> &[ReviewEntry] {
        &self.review
    }
}
