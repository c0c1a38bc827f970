use quiz_core::model::{MIN_AMOUNT, QuizSettingsDraft};

/// Whether a caller may enter the session view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    Proceed,
    /// Send the caller back to the configuration entry point.
    RedirectToSetup,
}

/// Gates entry to the session view based on the persisted configuration.
///
/// The check runs before any data is fetched and must re-run whenever the
/// configuration changes.
pub struct EntryGuard;

impl EntryGuard {
    /// Entry rule: the question amount is an integer of at least one.
    #[must_use]
    pub fn can_enter(draft: &QuizSettingsDraft) -> bool {
        draft.amount >= MIN_AMOUNT
    }

    #[must_use]
    pub fn decide(draft: &QuizSettingsDraft) -> EntryDecision {
        if Self::can_enter(draft) {
            EntryDecision::Proceed
        } else {
            EntryDecision::RedirectToSetup
        }
    }

    /// Policy carried over from the configuration form: block starting a
    /// session while the category list is still loading and a specific
    /// category is selected. Deliberately narrow; do not generalize.
    #[must_use]
    pub fn start_blocked(draft: &QuizSettingsDraft, categories_loading: bool) -> bool {
        categories_loading && !draft.category.trim().is_empty()
    }
}
