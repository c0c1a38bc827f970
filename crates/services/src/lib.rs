#![forbid(unsafe_code)]

pub mod access_gate;
pub mod category_cache;
pub mod client;
pub mod data_source;
pub mod entry_guard;
pub mod error;
pub mod question_builder;
pub mod session;
pub mod settings_service;

pub use access_gate::AccessGate;
pub use category_cache::CategoryCache;
pub use client::{OpenTdbClient, QuestionBankClient, QuestionQuery, normalize_categories};
pub use data_source::{DataSource, DataSourceConfig, FetchOutcome};
pub use entry_guard::{EntryDecision, EntryGuard};
pub use error::TransportError;
pub use question_builder::build_questions;
pub use quiz_core::Clock;
pub use session::{SessionEngine, SessionPhase};
pub use settings_service::SettingsService;
