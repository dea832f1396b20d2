//! Offline command queue and the repository provider seam

mod queue;
mod repo;

pub use queue::{CommandKind, DrainReport, OfflineQueue, PendingCommand};
pub use repo::{CommitRecord, RepoError, RepoProvider, SimulatedRepo};
