//! Incremental summary consumer
//!
//! Fragments stream in from a producer task; only those carrying the
//! currently active request id are accepted. Completion freezes the
//! final text as the concatenation of accepted fragments in arrival
//! order.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifies one summarization request and the uploaded file behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// Lifecycle of the summary slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Idle,
    Streaming,
    Complete,
    Failed,
}

/// The summary side of the session
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// Request whose fragments are currently accepted
    pub source_file: Option<FileId>,
    /// Append-only while the request is streaming
    fragments: Vec<String>,
    /// Frozen on completion; None while streaming or after failure
    pub final_text: Option<String>,
    pub status: SummaryStatus,
    /// Whether the finished summary is being played back
    pub playing: bool,
}

impl Default for SummaryState {
    fn default() -> Self {
        Self {
            source_file: None,
            fragments: Vec::new(),
            final_text: None,
            status: SummaryStatus::Idle,
            playing: false,
        }
    }
}

impl SummaryState {
    /// Mark the slot as waiting for an upload to arrive.
    pub fn begin_upload(&mut self) {
        self.status = SummaryStatus::Streaming;
    }

    /// Activate a new request, abandoning any in-flight one.
    ///
    /// Future fragments from the superseded request become orphans and
    /// are dropped by `accept_fragment`.
    pub fn start(&mut self, request: FileId) {
        if self.status == SummaryStatus::Streaming {
            if let Some(previous) = self.source_file {
                debug!(%previous, %request, "superseding in-flight summary request");
            }
        }
        self.source_file = Some(request);
        self.fragments.clear();
        self.final_text = None;
        self.status = SummaryStatus::Streaming;
        self.playing = false;
    }

    /// Append a fragment if it belongs to the active request.
    ///
    /// Stale fragments are dropped silently apart from a debug log;
    /// returns whether the fragment was accepted.
    pub fn accept_fragment(&mut self, request: FileId, text: &str) -> bool {
        if self.source_file != Some(request) || self.status != SummaryStatus::Streaming {
            debug!(%request, "dropping stale summary fragment");
            return false;
        }
        self.fragments.push(text.to_string());
        true
    }

    /// Freeze the final text from all accepted fragments, in order.
    pub fn complete(&mut self, request: FileId) -> bool {
        if self.source_file != Some(request) || self.status != SummaryStatus::Streaming {
            debug!(%request, "dropping stale summary completion");
            return false;
        }
        self.final_text = Some(self.fragments.concat());
        self.status = SummaryStatus::Complete;
        true
    }

    /// Mark the active request as failed.
    pub fn fail(&mut self, request: FileId) -> bool {
        if self.source_file != Some(request) {
            debug!(%request, "dropping stale summary failure");
            return false;
        }
        self.mark_failed();
        true
    }

    /// Record a failure that happened before a request id existed,
    /// such as the upload transport rejecting the file.
    pub fn mark_failed(&mut self) {
        self.status = SummaryStatus::Failed;
        self.final_text = None;
    }

    /// Number of fragments accepted so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}
