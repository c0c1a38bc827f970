//! Shared error types for the services crate.
//!
//! Only transport failures propagate to callers. Storage failures are
//! absorbed where they occur (the cooldown and category cache degrade to
//! "no memory" instead of failing), and cancellation is modelled as a
//! non-error outcome, never as an error variant.

use thiserror::Error;

/// Errors from the question-bank transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("question bank request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
