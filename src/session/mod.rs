//! Session state, intent application, and the orchestrator loop
//!
//! One `SessionState` exists per session, owned by the orchestrator.
//! All substates persist across mode switches; only the orchestrator
//! loop mutates any of it.

mod machine;
mod orchestrator;
mod state;

pub use orchestrator::{Orchestrator, SessionMsg};
pub use state::{FileRecord, Mode, RepoState, SessionState};
