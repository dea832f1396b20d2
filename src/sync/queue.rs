//! Durable in-session buffer for connectivity-requiring commands
//!
//! Commands enqueue while offline and replay in FIFO order on the next
//! offline-to-online transition. A command leaves the queue only after
//! its effect is applied; a failed apply halts the drain with the
//! failed command still at the front, preserving commit order for the
//! next attempt.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::time::Instant;

use tracing::{info, warn};

/// What a deferred command does when replayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Push the captured code snapshot
    Push,
    /// Create a branch on the remote
    CreateBranch { name: String },
}

impl CommandKind {
    /// Stable label for connectivity-policy lookups and logging
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Push => "push",
            CommandKind::CreateBranch { .. } => "branch",
        }
    }
}

/// A connectivity-requiring action deferred for later replay
#[derive(Debug, Clone)]
pub struct PendingCommand {
    pub kind: CommandKind,
    /// Code buffer exactly as it was when the command was issued
    pub code_snapshot: String,
    pub enqueued_at: Instant,
}

impl PendingCommand {
    pub fn new(kind: CommandKind, code_snapshot: String) -> Self {
        Self {
            kind,
            code_snapshot,
            enqueued_at: Instant::now(),
        }
    }
}

/// Result of one drain pass
#[derive(Debug)]
pub struct DrainReport {
    /// Commands whose effects were applied, in replay order
    pub applied: Vec<PendingCommand>,
    pub remaining: usize,
    pub error: Option<String>,
}

/// FIFO queue of deferred commands
#[derive(Debug, Default)]
pub struct OfflineQueue {
    commands: VecDeque<PendingCommand>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Snapshot of the command at the head of the queue.
    pub fn front(&self) -> Option<&PendingCommand> {
        self.commands.front()
    }

    /// Append a command to the back of the queue.
    pub fn enqueue(&mut self, command: PendingCommand) {
        info!(
            kind = command.kind.label(),
            pending = self.commands.len() + 1,
            "command queued for replay"
        );
        self.commands.push_back(command);
    }

    /// Replay queued commands in submission order.
    ///
    /// Each command is removed only after `apply` succeeds. On the
    /// first failure the drain halts: the failed command stays at the
    /// front and everything behind it is untouched.
    pub async fn drain<F, Fut, E>(&mut self, mut apply: F) -> DrainReport
    where
        F: FnMut(PendingCommand) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let mut applied = Vec::new();

        while let Some(command) = self.commands.front().cloned() {
            let queued_for_ms = command.enqueued_at.elapsed().as_millis() as u64;
            let kind = command.kind.label();

            match apply(command.clone()).await {
                Ok(()) => {
                    self.commands.pop_front();
                    applied.push(command);
                    info!(kind, queued_for_ms, "queued command replayed");
                }
                Err(e) => {
                    warn!(
                        kind,
                        applied = applied.len(),
                        remaining = self.commands.len(),
                        error = %e,
                        "drain halted; queue preserved"
                    );
                    return DrainReport {
                        applied,
                        remaining: self.commands.len(),
                        error: Some(e.to_string()),
                    };
                }
            }
        }

        DrainReport {
            applied,
            remaining: 0,
            error: None,
        }
    }
}
