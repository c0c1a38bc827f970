use chrono::{DateTime, Duration, Utc};

use quiz_core::model::{AnswerId, Question, QuizResult, QuizResultError, ReviewEntry};
use quiz_core::timer::QuestionTimer;

/// The states of a session run. A transition replaces the whole value
/// rather than mutating in place, so transitions are easy to log and test.
#[derive(Debug)]
pub enum SessionPhase {
    /// No run started, or the last run was abandoned.
    Idle,
    /// A question fetch is in flight.
    Loading,
    /// The fetch failed; the message is surfaced for display.
    Failed { message: String },
    /// The fetch succeeded but yielded zero questions. Terminal, non-error;
    /// the caller restarts with different settings.
    Empty,
    /// Questions are live and the per-question countdown is armed.
    Active(ActiveSession),
    /// The run completed and produced a result.
    Finished,
}

impl SessionPhase {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Active(_))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Finished)
    }
}

/// Live state of an in-flight run: the questions, one selection slot per
/// question, the cursor, the running score, and the current deadline.
#[derive(Debug)]
pub struct ActiveSession {
    questions: Vec<Question>,
    selections: Vec<Option<AnswerId>>,
    current: usize,
    score: u32,
    timer: QuestionTimer,
    question_duration: Duration,
}

impl ActiveSession {
    /// Start a run over the given questions with the timer armed for the
    /// first one. Callers guarantee `questions` is non-empty.
    #[must_use]
    pub fn new(questions: Vec<Question>, now: DateTime<Utc>, question_duration: Duration) -> Self {
        let selections = vec![None; questions.len()];
        Self {
            questions,
            selections,
            current: 0,
            score: 0,
            timer: QuestionTimer::starting_at(now, question_duration),
            question_duration,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn selected(&self, question_index: usize) -> Option<&AnswerId> {
        self.selections.get(question_index)?.as_ref()
    }

    #[must_use]
    pub fn timer(&self) -> QuestionTimer {
        self.timer
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Record a selection for the currently active question. Selecting for
    /// any other slot is a no-op; re-selecting overwrites the previous
    /// choice. Returns whether the selection was applied.
    pub fn select(&mut self, question_index: usize, answer: AnswerId) -> bool {
        if question_index != self.current {
            return false;
        }
        let belongs = self
            .current_question()
            .is_some_and(|question| question.answer_label(&answer).is_some());
        if !belongs {
            return false;
        }
        self.selections[self.current] = Some(answer);
        true
    }

    /// Score the current question: the score increments iff a selection
    /// exists and matches the correct id.
    pub(super) fn score_current(&mut self) {
        let hit = match (self.selections.get(self.current), self.current_question()) {
            (Some(Some(selected)), Some(question)) => selected == question.correct_answer_id(),
            _ => false,
        };
        if hit {
            self.score += 1;
        }
    }

    /// Move the cursor to the next question and re-arm the timer.
    pub(super) fn advance_to_next(&mut self, now: DateTime<Utc>) {
        self.current += 1;
        self.timer = QuestionTimer::starting_at(now, self.question_duration);
    }

    /// Snapshot the run into its final result, zipping every question with
    /// its selection slot.
    pub(super) fn into_result(self) -> Result<QuizResult, QuizResultError> {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let review: Vec<ReviewEntry> = self
            .questions
            .iter()
            .zip(&self.selections)
            .map(|(question, selected)| ReviewEntry::from_question(question, selected.clone()))
            .collect();
        QuizResult::new(self.score, total, review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Answer;
    use quiz_core::time::fixed_now;

    fn build_question(index: usize) -> Question {
        Question::new(
            format!("Question {index}"),
            vec![
                Answer {
                    id: AnswerId::correct(index),
                    label: "Right".into(),
                },
                Answer {
                    id: AnswerId::incorrect(index, 0),
                    label: "Wrong".into(),
                },
            ],
            AnswerId::correct(index),
        )
        .unwrap()
    }

    fn active(total: usize) -> ActiveSession {
        let questions = (0..total).map(build_question).collect();
        ActiveSession::new(questions, fixed_now(), Duration::seconds(20))
    }

    #[test]
    fn selections_start_empty() {
        let session = active(3);
        assert_eq!(session.total(), 3);
        for index in 0..3 {
            assert!(session.selected(index).is_none());
        }
    }

    #[test]
    fn select_applies_only_to_the_current_question() {
        let mut session = active(2);

        assert!(session.select(0, AnswerId::correct(0)));
        assert!(!session.select(1, AnswerId::correct(1)));
        assert!(session.selected(1).is_none());
    }

    #[test]
    fn select_rejects_foreign_answer_ids() {
        let mut session = active(2);
        assert!(!session.select(0, AnswerId::new("q7-c")));
        assert!(session.selected(0).is_none());
    }

    #[test]
    fn reselecting_overwrites_the_previous_choice() {
        let mut session = active(1);
        assert!(session.select(0, AnswerId::correct(0)));
        assert!(session.select(0, AnswerId::incorrect(0, 0)));
        assert_eq!(session.selected(0), Some(&AnswerId::incorrect(0, 0)));
    }

    #[test]
    fn scoring_requires_a_matching_selection() {
        let mut session = active(2);

        session.select(0, AnswerId::incorrect(0, 0));
        session.score_current();
        assert_eq!(session.score(), 0);

        session.advance_to_next(fixed_now());
        session.select(1, AnswerId::correct(1));
        session.score_current();
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn advancing_rearms_the_timer() {
        let mut session = active(2);
        let later = fixed_now() + Duration::seconds(12);
        session.advance_to_next(later);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.timer().deadline(), later + Duration::seconds(20));
    }

    #[test]
    fn result_zips_questions_with_selections() {
        let mut session = active(2);
        session.select(0, AnswerId::correct(0));
        session.score_current();
        session.advance_to_next(fixed_now());

        let result = session.into_result().unwrap();
        assert_eq!(result.score(), 1);
        assert_eq!(result.total(), 2);
        assert_eq!(
            result.review()[0].selected_answer_id,
            Some(AnswerId::correct(0))
        );
        assert_eq!(result.review()[1].selected_answer_id, None);
    }
}
