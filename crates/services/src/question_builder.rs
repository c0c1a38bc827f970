//! Turns raw question-bank records into playable questions.
//!
//! For the record at position `i`, entity-escaped text is decoded, ids are
//! assigned before shuffling (`q{i}-c`, `q{i}-i{k}`), and the combined
//! answer list gets an independent uniform permutation per question.

use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Answer, AnswerId, Question, QuestionError, RawQuestion};

/// Build playable questions from raw records. Zero records yields an empty
/// list, not an error.
///
/// # Errors
///
/// Returns `QuestionError` if a produced answer set violates the question
/// invariants; ids assigned here are unique by construction, so this only
/// guards against malformed future inputs.
pub fn build_questions<R: Rng + ?Sized>(
    raw: &[RawQuestion],
    rng: &mut R,
) -> Result<Vec<Question>, QuestionError> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| build_question(index, record, rng))
        .collect()
}

fn build_question<R: Rng + ?Sized>(
    index: usize,
    record: &RawQuestion,
    rng: &mut R,
) -> Result<Question, QuestionError> {
    let mut answers = Vec::with_capacity(record.incorrect_answers.len() + 1);
    answers.push(Answer {
        id: AnswerId::correct(index),
        label: record.correct_label(),
    });
    for (k, label) in record.incorrect_labels().into_iter().enumerate() {
        answers.push(Answer {
            id: AnswerId::incorrect(index, k),
            label,
        });
    }

    answers.shuffle(rng);

    Question::new(record.question_text(), answers, AnswerId::correct(index))
}
