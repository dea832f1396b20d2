//! Repository provider seam
//!
//! The daemon never talks to a real source-control host. The trait
//! captures the operations the session assumes a provider exposes; the
//! simulated implementation records them in memory and always succeeds.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

/// Failures surfaced by a repository provider
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("remote rejected {op}: {reason}")]
    Rejected { op: &'static str, reason: String },
}

/// One applied push, as remembered by the provider
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub message: String,
}

/// Push, branch, and commit-log operations on a remote repository
#[async_trait]
pub trait RepoProvider: Send + Sync {
    async fn push(&self, snapshot: &str) -> Result<(), RepoError>;

    async fn create_branch(&self, name: &str) -> Result<(), RepoError>;

    async fn list_commits(&self) -> Vec<CommitRecord>;
}

/// In-memory provider that records operations instead of performing them
#[derive(Debug, Default)]
pub struct SimulatedRepo {
    commits: Mutex<Vec<CommitRecord>>,
    branches: Mutex<Vec<String>>,
}

#[async_trait]
impl RepoProvider for SimulatedRepo {
    async fn push(&self, snapshot: &str) -> Result<(), RepoError> {
        let message = format!("voice push: {} chars", snapshot.len());
        let mut commits = self.commits.lock().await;
        commits.push(CommitRecord {
            message: message.clone(),
        });
        info!(commit = %message, total = commits.len(), "simulated push applied");
        Ok(())
    }

    async fn create_branch(&self, name: &str) -> Result<(), RepoError> {
        if name.trim().is_empty() {
            return Err(RepoError::Rejected {
                op: "branch",
                reason: "branch name is empty".to_string(),
            });
        }
        let mut branches = self.branches.lock().await;
        branches.push(name.to_string());
        info!(branch = name, total = branches.len(), "simulated branch created");
        Ok(())
    }

    async fn list_commits(&self) -> Vec<CommitRecord> {
        self.commits.lock().await.clone()
    }
}
