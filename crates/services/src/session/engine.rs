use chrono::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use quiz_core::Clock;
use quiz_core::model::{AnswerId, QuizResult, QuizSettings};
use quiz_core::timer;

use crate::client::QuestionQuery;
use crate::data_source::{DataSource, FetchOutcome};
use crate::question_builder::build_questions;
use crate::session::state::{ActiveSession, SessionPhase};

/// Drives one session run at a time: fetch, per-question countdown,
/// scoring, and result production.
///
/// The engine is single-owner by design. All mutation goes through
/// `&mut self`, which is what rules out a superseded fetch applying late
/// side effects; a cancelled fetch resolves to `Cancelled` and mutates
/// nothing beyond returning to `Idle`.
pub struct SessionEngine {
    clock: Clock,
    data_source: DataSource,
    question_duration: Duration,
    phase: SessionPhase,
    result: Option<QuizResult>,
}

impl SessionEngine {
    #[must_use]
    pub fn new(clock: Clock, data_source: DataSource) -> Self {
        Self {
            clock,
            data_source,
            question_duration: Duration::milliseconds(timer::QUESTION_DURATION_MS),
            phase: SessionPhase::Idle,
            result: None,
        }
    }

    #[must_use]
    pub fn with_question_duration(mut self, duration: Duration) -> Self {
        self.question_duration = duration;
        self
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// True while a run is loading or live. Collaborators use this to keep
    /// a second session from starting over the current one.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self.phase, SessionPhase::Loading | SessionPhase::Active(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Hand the final result to the review renderer, leaving none behind.
    pub fn take_result(&mut self) -> Option<QuizResult> {
        self.result.take()
    }

    /// Start a run from validated settings, discarding any prior result.
    ///
    /// Resolves into `Active`, `Empty`, or `Failed`; a cancellation
    /// (abandoning before the load completes) lands back in `Idle` with no
    /// result and no error surfaced.
    pub async fn start(&mut self, settings: &QuizSettings, cancel: &CancellationToken) {
        self.result = None;
        self.phase = SessionPhase::Loading;

        let query = QuestionQuery::from_settings(settings);
        let set = match self.data_source.fetch_questions(&query, cancel).await {
            Ok(FetchOutcome::Fetched(set)) => set,
            Ok(FetchOutcome::Cancelled) => {
                self.phase = SessionPhase::Idle;
                return;
            }
            Err(err) => {
                warn!("question fetch failed: {err}");
                self.phase = SessionPhase::Failed {
                    message: err.to_string(),
                };
                return;
            }
        };

        if set.is_empty() {
            self.phase = SessionPhase::Empty;
            return;
        }

        let mut rng = rand::rng();
        match build_questions(&set.results, &mut rng) {
            Ok(questions) => {
                let now = self.clock.now();
                self.phase =
                    SessionPhase::Active(ActiveSession::new(questions, now, self.question_duration));
            }
            Err(err) => {
                self.phase = SessionPhase::Failed {
                    message: err.to_string(),
                };
            }
        }
    }

    /// Record a selection for the currently active question. A no-op in
    /// every other phase or for any other slot.
    pub fn select_answer(&mut self, question_index: usize, answer: AnswerId) {
        if let SessionPhase::Active(active) = &mut self.phase {
            active.select(question_index, answer);
        }
    }

    /// Score the current question and move on, finishing the run when the
    /// last question is scored. A no-op unless a run is live.
    pub fn advance(&mut self) {
        if !self.phase.is_active() {
            return;
        }
        let SessionPhase::Active(mut active) =
            std::mem::replace(&mut self.phase, SessionPhase::Finished)
        else {
            return;
        };

        active.score_current();

        if active.is_last_question() {
            match active.into_result() {
                Ok(result) => self.result = Some(result),
                Err(err) => {
                    self.phase = SessionPhase::Failed {
                        message: err.to_string(),
                    };
                }
            }
        } else {
            active.advance_to_next(self.clock.now());
            self.phase = SessionPhase::Active(active);
        }
    }

    /// Timer pulse: advances automatically once the current question's
    /// deadline has passed. A no-op otherwise.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let SessionPhase::Active(active) = &self.phase {
            if active.timer().is_expired(now) {
                self.advance();
            }
        }
    }

    /// Time left on the current question, for display.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        match &self.phase {
            SessionPhase::Active(active) => Some(active.timer().remaining(self.clock.now())),
            _ => None,
        }
    }

    /// Delay until the tick source should fire next, resynchronized to the
    /// whole-second boundary. `None` when no countdown is running.
    #[must_use]
    pub fn next_tick_delay(&self) -> Option<Duration> {
        match &self.phase {
            SessionPhase::Active(active) => {
                let now = self.clock.now();
                Some(timer::next_tick_delay(now).min(active.timer().remaining(now)))
            }
            _ => None,
        }
    }

    /// Walk away from the current run. In-progress state is dropped without
    /// producing a result; a finished run keeps its result until the next
    /// start.
    pub fn abandon(&mut self) {
        if !self.phase.is_finished() {
            self.phase = SessionPhase::Idle;
        }
    }
}
