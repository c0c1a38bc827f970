mod engine;
mod state;

// Public API of the session subsystem.
pub use engine::SessionEngine;
pub use state::{ActiveSession, SessionPhase};
