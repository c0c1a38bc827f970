use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::model::{QuizSettings, QuizSettingsDraft, QuizSettingsError};
use storage::repository::{KeyValueStore, keys};

/// Loads and persists the session configuration under the settings key, so
/// a restart or a direct jump into the session view still finds it.
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted draft. Missing, unreadable, or corrupt payloads
    /// load as defaults rather than failing.
    pub async fn load(&self) -> QuizSettingsDraft {
        let bytes = match self.store.get(keys::SETTINGS).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return QuizSettingsDraft::default(),
            Err(err) => {
                debug!("settings unavailable, using defaults: {err}");
                return QuizSettingsDraft::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            debug!("discarding corrupt persisted settings: {err}");
            QuizSettingsDraft::default()
        })
    }

    /// Validate and persist new settings. Persistence is best-effort; only
    /// validation can fail the call.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the draft does not validate.
    pub async fn save(&self, draft: &QuizSettingsDraft) -> Result<QuizSettings, QuizSettingsError> {
        let settings = draft.validate()?;

        match serde_json::to_vec(&settings.to_draft()) {
            Ok(bytes) => {
                if let Err(err) = self.store.put(keys::SETTINGS, &bytes).await {
                    warn!("failed to persist settings: {err}");
                }
            }
            Err(err) => warn!("failed to encode settings: {err}"),
        }

        Ok(settings)
    }
}
