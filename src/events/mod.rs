//! Session event bus
//!
//! Structured events emitted by the orchestrator during state changes,
//! broadcast to the IPC server for delivery to subscribed clients.

use serde::{Deserialize, Serialize};

use crate::session::Mode;
use crate::summary::FileId;

/// Events emitted while a session runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Active mode changed
    ModeChanged { from: Mode, to: Mode },

    /// Connectivity level changed
    ConnectivityChanged { online: bool },

    /// A connectivity-requiring command was deferred
    CommandQueued { kind: String, pending: usize },

    /// Queued commands replayed after coming online
    QueueDrained { applied: usize },

    /// Replay halted on a failing command; the remainder is preserved
    QueueStalled {
        applied: usize,
        remaining: usize,
        reason: String,
    },

    /// A push was applied directly while online
    RepoPushed { snapshot_chars: usize },

    /// Summary fragments started streaming for an uploaded file
    SummaryStreaming { file: FileId, name: String },

    /// Final summary text frozen
    SummaryCompleted { file: FileId, chars: usize },

    /// Summary request failed
    SummaryFailed { reason: String },

    /// Summary playback started
    PlaybackStarted,

    /// Summary playback paused
    PlaybackPaused,

    /// A response the front-end should voice
    Speak { text: String, rate: f32, pitch: f32 },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ModeChanged { from, to } => {
                write!(f, "MODE_CHANGED ({from} -> {to})")
            }
            SessionEvent::ConnectivityChanged { online } => {
                write!(f, "CONNECTIVITY_CHANGED (online={online})")
            }
            SessionEvent::CommandQueued { kind, pending } => {
                write!(f, "COMMAND_QUEUED ({kind}, {pending} pending)")
            }
            SessionEvent::QueueDrained { applied } => {
                write!(f, "QUEUE_DRAINED ({applied} applied)")
            }
            SessionEvent::QueueStalled {
                applied, remaining, ..
            } => {
                write!(f, "QUEUE_STALLED ({applied} applied, {remaining} left)")
            }
            SessionEvent::RepoPushed { snapshot_chars } => {
                write!(f, "REPO_PUSHED ({snapshot_chars} chars)")
            }
            SessionEvent::SummaryStreaming { name, .. } => {
                write!(f, "SUMMARY_STREAMING ({name})")
            }
            SessionEvent::SummaryCompleted { chars, .. } => {
                write!(f, "SUMMARY_COMPLETED ({chars} chars)")
            }
            SessionEvent::SummaryFailed { .. } => write!(f, "SUMMARY_FAILED"),
            SessionEvent::PlaybackStarted => write!(f, "PLAYBACK_STARTED"),
            SessionEvent::PlaybackPaused => write!(f, "PLAYBACK_PAUSED"),
            SessionEvent::Speak { .. } => write!(f, "SPEAK"),
        }
    }
}
