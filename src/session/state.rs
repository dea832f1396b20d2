//! The session aggregate
//!
//! Consolidates what the product tracks for one user session: active
//! mode, the code buffer, the summary slot, repository state, the
//! recent-files carousel, connectivity, and the offline command queue.

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::summary::{FileId, LocationRef, SummaryState};
use crate::sync::{CommandKind, OfflineQueue};

/// Initial contents of the code buffer
pub const WELCOME_CODE: &str = "// Welcome to CodeDrive!\n// Say \"add a function\" to get started\n\nfunction hello() {\n  console.log(\"Hello, CodeDrive!\");\n}";

/// The recent-files carousel keeps at most this many records
pub const RECENT_FILES_LIMIT: usize = 5;

/// Default repository name used when connecting without one
pub const DEFAULT_REPO_NAME: &str = "user/codedrive-project";

/// The three mutually exclusive operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Voice-driven code editing
    Code,
    /// File upload and TL;DR summarization
    Summarize,
    /// Source-control sync
    Repo,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Code
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Code => write!(f, "Code"),
            Mode::Summarize => write!(f, "Summarize"),
            Mode::Repo => write!(f, "Repo"),
        }
    }
}

/// An uploaded file; immutable once recorded
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub location: LocationRef,
    pub created_at: Instant,
}

/// Source-control side of the session
#[derive(Debug, Clone)]
pub struct RepoState {
    pub connected: bool,
    pub repo_name: Option<String>,
    pub branch: String,
    /// Operation labels that must queue while offline
    connectivity_required: HashSet<&'static str>,
}

impl Default for RepoState {
    fn default() -> Self {
        Self {
            connected: false,
            repo_name: None,
            branch: "main".to_string(),
            connectivity_required: ["push", "branch"].into_iter().collect(),
        }
    }
}

impl RepoState {
    /// Whether this command kind needs the network and must defer offline
    pub fn requires_connectivity(&self, kind: &CommandKind) -> bool {
        self.connectivity_required.contains(kind.label())
    }
}

/// Everything one session tracks
#[derive(Debug)]
pub struct SessionState {
    pub mode: Mode,
    pub code: String,
    pub summary: SummaryState,
    pub repo: RepoState,
    /// Most recent first, FIFO-evicted beyond the cap
    pub recent_files: Vec<FileRecord>,
    pub online: bool,
    pub pending: OfflineQueue,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Code,
            code: WELCOME_CODE.to_string(),
            summary: SummaryState::default(),
            repo: RepoState::default(),
            recent_files: Vec::new(),
            online: true,
            pending: OfflineQueue::new(),
        }
    }

    /// Record an upload at the front of the carousel, evicting the
    /// oldest entries beyond the cap.
    pub fn record_upload(&mut self, record: FileRecord) {
        self.recent_files.insert(0, record);
        self.recent_files.truncate(RECENT_FILES_LIMIT);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
