use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for one answer within a session.
///
/// Ids are assigned before shuffling (`q{i}-c` for the correct answer,
/// `q{i}-i{k}` for the k-th incorrect one), so they carry no information
/// about the shuffled position.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnswerId(String);

impl AnswerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the correct answer for the question at `question_index`.
    #[must_use]
    pub fn correct(question_index: usize) -> Self {
        Self(format!("q{question_index}-c"))
    }

    /// Id of the `k`-th incorrect answer for the question at `question_index`.
    #[must_use]
    pub fn incorrect(question_index: usize, k: usize) -> Self {
        Self(format!("q{question_index}-i{k}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnswerId({})", self.0)
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable answer, already decoded for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub label: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected exactly one answer with the correct id, found {found}")]
    CorrectAnswerMismatch { found: usize },

    #[error("duplicate answer id within a question: {id}")]
    DuplicateAnswerId { id: AnswerId },
}

/// A playable question: decoded text, shuffled answers, and the id of the
/// correct answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<Answer>,
    correct_answer_id: AnswerId,
}

impl Question {
    /// Assemble a question, enforcing its id invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::DuplicateAnswerId` if two answers share an id,
    /// and `QuestionError::CorrectAnswerMismatch` unless exactly one answer
    /// carries `correct_answer_id`.
    pub fn new(
        text: impl Into<String>,
        answers: Vec<Answer>,
        correct_answer_id: AnswerId,
    ) -> Result<Self, QuestionError> {
        let mut seen = HashSet::new();
        for answer in &answers {
            if !seen.insert(&answer.id) {
                return Err(QuestionError::DuplicateAnswerId {
                    id: answer.id.clone(),
                });
            }
        }

        let found = answers
            .iter()
            .filter(|answer| answer.id == correct_answer_id)
            .count();
        if found != 1 {
            return Err(QuestionError::CorrectAnswerMismatch { found });
        }

        Ok(Self {
            text: text.into(),
            answers,
            correct_answer_id,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn correct_answer_id(&self) -> &AnswerId {
        &self.correct_answer_id
    }

    /// Display label for the given answer id, if it belongs to this question.
    #[must_use]
    pub fn answer_label(&self, id: &AnswerId) -> Option<&str> {
        self.answers
            .iter()
            .find(|answer| &answer.id == id)
            .map(|answer| answer.label.as_str())
    }
}

/// One record as served by the question bank, fields still HTML-escaped.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

impl RawQuestion {
    /// Question text with HTML entities decoded.
    #[must_use]
    pub fn question_text(&self) -> String {
        decode(&self.question)
    }

    /// Correct answer label with HTML entities decoded.
    #[must_use]
    pub fn correct_label(&self) -> String {
        decode(&self.correct_answer)
    }

    /// Incorrect answer labels with HTML entities decoded.
    #[must_use]
    pub fn incorrect_labels(&self) -> Vec<String> {
        self.incorrect_answers.iter().map(|s| decode(s)).collect()
    }
}

fn decode(escaped: &str) -> String {
    match html_escape::decode_html_entities(escaped) {
        Cow::Borrowed(s) => s.to_owned(),
        Cow::Owned(s) => s,
    }
}

/// Raw question-bank response: a response code and however many records the
/// bank could serve (possibly none).
#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
pub struct RawQuestionSet {
    #[serde(default)]
    pub response_code: i64,
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

impl RawQuestionSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }
}
