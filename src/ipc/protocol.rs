//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. After `subscribe`, the connection becomes a one-way stream
//! of event notifications.

use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;
use crate::session::Mode;
use crate::summary::SummaryStatus;

/// Requests from the front-end to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// A recognized voice transcript
    Transcript { text: String },

    /// File bytes for summarization
    UploadFile { name: String, contents: Vec<u8> },

    /// Raw connectivity level from the host environment
    SetConnectivity { online: bool },

    /// Attach a repository by name (empty selects the product default)
    ConnectRepo { name: String },

    /// Create a branch; queued while offline
    CreateBranch { name: String },

    /// Commit log from the provider
    ListCommits,

    /// Request current daemon status
    GetStatus,

    /// Ping to check the daemon is alive
    Ping,

    /// Switch this connection to the notification stream
    Subscribe,
}

/// Responses from the daemon to the front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Text the user reads (or hears, when offline)
    Reply { text: String },

    /// Current daemon status
    Status(DaemonStatus),

    /// Commit messages, oldest first
    Commits { messages: Vec<String> },

    /// Pong response to ping
    Pong,

    /// Subscription confirmed; notifications follow
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification for subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A session event occurred
    Event(SessionEvent),
}

/// A recently uploaded file, as shown in the status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentFile {
    pub name: String,
    pub age_secs: u64,
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current operating mode
    pub mode: Mode,

    /// Connectivity level as last observed
    pub online: bool,

    /// Commands waiting for the next online transition
    pub pending_commands: usize,

    /// Lifecycle of the summary slot
    pub summary: SummaryStatus,

    /// Attached repository, if any
    pub repo_name: Option<String>,

    pub branch: String,

    /// Most recent uploads, newest first
    pub recent_files: Vec<RecentFile>,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = Request::Transcript {
            text: "add a function".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("transcript"));
        assert!(json.contains("add a function"));
    }

    #[test]
    fn request_deserialization() {
        let json = r#"{"type":"set_connectivity","online":false}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(req, Request::SetConnectivity { online: false }));
    }

    #[test]
    fn status_response_round_trips() {
        let status = DaemonStatus {
            version: "0.1.0".to_string(),
            mode: Mode::Summarize,
            online: false,
            pending_commands: 2,
            summary: SummaryStatus::Streaming,
            repo_name: None,
            branch: "main".to_string(),
            recent_files: vec![RecentFile {
                name: "notes.pdf".to_string(),
                age_secs: 12,
            }],
            uptime_secs: 99,
        };

        let json = serde_json::to_string(&Response::Status(status)).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        match back {
            Response::Status(status) => {
                assert_eq!(status.mode, Mode::Summarize);
                assert_eq!(status.pending_commands, 2);
                assert_eq!(status.recent_files.len(), 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn notification_wraps_session_events() {
        let notification = Notification::Event(SessionEvent::QueueDrained { applied: 3 });
        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("event"));
        assert!(json.contains("queue_drained"));
    }
}
