//! Session orchestrator
//!
//! The single writer for `SessionState`. Requests from the IPC surface
//! and signals from summarization producer tasks funnel into one loop
//! and are handled to completion one at a time, so transcript handling
//! and fragment delivery never race on the session.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::events::SessionEvent;
use crate::intent::{classify, Intent};
use crate::ipc::{DaemonStatus, RecentFile};
use crate::speech::{SpeechOutput, SpeechParams};
use crate::summary::{
    FileId, FileTransport, SummaryPayload, SummaryProvider, SummarySignal,
};
use crate::sync::{CommandKind, PendingCommand, RepoProvider};

use super::machine;
use super::state::{FileRecord, SessionState, DEFAULT_REPO_NAME};

/// Messages accepted by the orchestrator loop
#[derive(Debug)]
pub enum SessionMsg {
    /// A recognized voice transcript; the reply carries the response text
    Transcript {
        text: String,
        reply: oneshot::Sender<String>,
    },
    /// File bytes from the upload front-end
    Upload {
        name: String,
        contents: Vec<u8>,
        reply: oneshot::Sender<String>,
    },
    /// Raw connectivity level from the host environment
    Connectivity {
        online: bool,
        reply: oneshot::Sender<String>,
    },
    /// Attach a named repository (empty name selects the default)
    ConnectRepo {
        name: String,
        reply: oneshot::Sender<String>,
    },
    /// Create a branch; queued while offline, like push
    CreateBranch {
        name: String,
        reply: oneshot::Sender<String>,
    },
    /// Commit log from the provider
    ListCommits {
        reply: oneshot::Sender<Vec<String>>,
    },
    /// Status snapshot
    Status {
        reply: oneshot::Sender<DaemonStatus>,
    },
}

/// Owns the session and drives it from incoming messages
pub struct Orchestrator {
    state: SessionState,
    monitor: ConnectivityMonitor,
    speech: Box<dyn SpeechOutput>,
    speech_params: SpeechParams,
    repo: Arc<dyn RepoProvider>,
    transport: Arc<dyn FileTransport>,
    summarizer: Arc<dyn SummaryProvider>,
    event_tx: broadcast::Sender<SessionEvent>,
    summary_tx: mpsc::Sender<SummarySignal>,
    next_file_id: u64,
    started_at: Instant,
}

impl Orchestrator {
    pub fn new(
        speech: Box<dyn SpeechOutput>,
        repo: Arc<dyn RepoProvider>,
        transport: Arc<dyn FileTransport>,
        summarizer: Arc<dyn SummaryProvider>,
        speech_params: SpeechParams,
        event_tx: broadcast::Sender<SessionEvent>,
        summary_tx: mpsc::Sender<SummarySignal>,
    ) -> Self {
        let state = SessionState::new();
        let monitor = ConnectivityMonitor::new(state.online);
        Self {
            state,
            monitor,
            speech,
            speech_params,
            repo,
            transport,
            summarizer,
            event_tx,
            summary_tx,
            next_file_id: 0,
            started_at: Instant::now(),
        }
    }

    /// Run the orchestrator until the request channel closes.
    ///
    /// Summary fragments may interleave with requests, but each message
    /// is handled to completion before the next is taken.
    pub async fn run(
        &mut self,
        mut msg_rx: mpsc::Receiver<SessionMsg>,
        mut summary_rx: mpsc::Receiver<SummarySignal>,
    ) {
        info!(mode = %self.state.mode, "session orchestrator started");

        loop {
            tokio::select! {
                msg = msg_rx.recv() => match msg {
                    Some(msg) => self.handle(msg).await,
                    None => break,
                },
                Some(signal) = summary_rx.recv() => self.handle_summary(signal),
            }
        }

        info!("session orchestrator stopped");
    }

    async fn handle(&mut self, msg: SessionMsg) {
        match msg {
            SessionMsg::Transcript { text, reply } => {
                let response = self.handle_transcript(&text).await;
                let _ = reply.send(response);
            }
            SessionMsg::Upload {
                name,
                contents,
                reply,
            } => {
                let response = self.handle_upload(name, contents).await;
                let _ = reply.send(response);
            }
            SessionMsg::Connectivity { online, reply } => {
                let response = self.handle_connectivity(online).await;
                let _ = reply.send(response);
            }
            SessionMsg::ConnectRepo { name, reply } => {
                let _ = reply.send(self.handle_connect_repo(name));
            }
            SessionMsg::CreateBranch { name, reply } => {
                let response = self.handle_create_branch(name).await;
                let _ = reply.send(response);
            }
            SessionMsg::ListCommits { reply } => {
                let messages = self
                    .repo
                    .list_commits()
                    .await
                    .into_iter()
                    .map(|commit| commit.message)
                    .collect();
                let _ = reply.send(messages);
            }
            SessionMsg::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    /// The externally callable entry point of the core: classify, apply,
    /// queue, and voice the response when offline.
    async fn handle_transcript(&mut self, text: &str) -> String {
        let intent = classify(text, self.state.mode);
        debug!(?intent, transcript = text, "transcript classified");

        let previous_mode = self.state.mode;
        let was_playing = self.state.summary.playing;

        let applied = machine::apply(&mut self.state, &intent);
        let mut response = applied.response;

        let deferred = applied.queued.is_some();
        if let Some(command) = applied.queued {
            let kind = command.kind.label().to_string();
            self.state.pending.enqueue(command);
            self.emit(SessionEvent::CommandQueued {
                kind,
                pending: self.state.pending.len(),
            });
        }

        match &intent {
            Intent::SwitchMode(_) if self.state.mode != previous_mode => {
                self.emit(SessionEvent::ModeChanged {
                    from: previous_mode,
                    to: self.state.mode,
                });
            }
            Intent::PushRepo if !deferred => {
                match self.repo.push(&self.state.code).await {
                    Ok(()) => self.emit(SessionEvent::RepoPushed {
                        snapshot_chars: self.state.code.len(),
                    }),
                    Err(e) => {
                        warn!(error = %e, "online push failed");
                        response = format!("Push didn't go through: {e}");
                    }
                }
            }
            Intent::PlaySummary if self.state.summary.playing && !was_playing => {
                self.emit(SessionEvent::PlaybackStarted);
            }
            Intent::PauseSummary if was_playing && !self.state.summary.playing => {
                self.emit(SessionEvent::PlaybackPaused);
            }
            _ => {}
        }

        // Voice confirmation is reserved for degraded paths; when online
        // the response is visible in the UI instead.
        if !self.state.online {
            self.speech.speak(&response, self.speech_params);
        }

        info!(mode = %self.state.mode, response = %response, "transcript handled");
        response
    }

    /// Store the file, start a fresh summary request, and spawn its
    /// producer. Transport failure marks the slot failed and leaves the
    /// rest of the session untouched.
    async fn handle_upload(&mut self, name: String, contents: Vec<u8>) -> String {
        match self.transport.upload(&name, &contents).await {
            Err(e) => {
                warn!(file = %name, error = %e, "upload failed");
                self.state.summary.mark_failed();
                self.emit(SessionEvent::SummaryFailed {
                    reason: e.to_string(),
                });
                format!("Upload failed: {e}")
            }
            Ok(location) => {
                let record = FileRecord {
                    id: self.allocate_file_id(),
                    name: name.clone(),
                    location,
                    created_at: Instant::now(),
                };
                info!(
                    file = %record.name,
                    id = %record.id,
                    location = %record.location.0,
                    "file uploaded"
                );

                self.state.summary.start(record.id);
                self.state.record_upload(record.clone());
                self.emit(SessionEvent::SummaryStreaming {
                    file: record.id,
                    name: record.name.clone(),
                });
                self.spawn_summarizer(record);

                format!("Summarizing {name} now - fragments are on the way!")
            }
        }
    }

    fn allocate_file_id(&mut self) -> FileId {
        self.next_file_id += 1;
        FileId(self.next_file_id)
    }

    /// Produce fragments on a separate task; the signals come back in
    /// through the orchestrator loop, so state mutation stays here.
    fn spawn_summarizer(&self, record: FileRecord) {
        let provider = Arc::clone(&self.summarizer);
        let tx = self.summary_tx.clone();
        tokio::spawn(async move {
            let request = record.id;
            if let Err(e) = provider.summarize(&record, tx.clone()).await {
                warn!(%request, error = %e, "summarizer task failed");
                let _ = tx
                    .send(SummarySignal {
                        request,
                        payload: SummaryPayload::Failed(e.to_string()),
                    })
                    .await;
            }
        });
    }

    fn handle_summary(&mut self, signal: SummarySignal) {
        match signal.payload {
            SummaryPayload::Fragment(text) => {
                if self.state.summary.accept_fragment(signal.request, &text) {
                    debug!(
                        file = %signal.request,
                        fragments = self.state.summary.fragment_count(),
                        "fragment accepted"
                    );
                }
            }
            SummaryPayload::Complete => {
                if self.state.summary.complete(signal.request) {
                    let chars = self
                        .state
                        .summary
                        .final_text
                        .as_deref()
                        .map(str::len)
                        .unwrap_or(0);
                    info!(file = %signal.request, chars, "summary complete");
                    self.emit(SessionEvent::SummaryCompleted {
                        file: signal.request,
                        chars,
                    });
                }
            }
            SummaryPayload::Failed(reason) => {
                if self.state.summary.fail(signal.request) {
                    self.emit(SessionEvent::SummaryFailed { reason });
                }
            }
        }
    }

    /// Feed a raw level through the edge detector; drain only fires on
    /// the offline-to-online edge, never on repeated online signals.
    async fn handle_connectivity(&mut self, online: bool) -> String {
        let Some(transition) = self.monitor.observe(online) else {
            debug!(online, "connectivity level unchanged");
            return "Connectivity unchanged.".to_string();
        };

        self.state.online = self.monitor.online();
        self.emit(SessionEvent::ConnectivityChanged {
            online: self.state.online,
        });

        match transition {
            Transition::WentOffline => {
                info!("connection lost; sync commands will queue");
                "Offline mode - sync commands will be queued.".to_string()
            }
            Transition::CameOnline => {
                info!(
                    pending = self.state.pending.len(),
                    "connection restored; draining queue"
                );
                self.drain_pending().await
            }
        }
    }

    async fn drain_pending(&mut self) -> String {
        if self.state.pending.is_empty() {
            return "Back online!".to_string();
        }
        debug!(
            next = self.state.pending.front().map(|c| c.kind.label()),
            "replaying queued commands"
        );

        let repo = Arc::clone(&self.repo);
        let report = self
            .state
            .pending
            .drain(move |command| {
                let repo = Arc::clone(&repo);
                async move {
                    match &command.kind {
                        CommandKind::Push => repo.push(&command.code_snapshot).await,
                        CommandKind::CreateBranch { name } => repo.create_branch(name).await,
                    }
                }
            })
            .await;

        // Replayed branch creations still move the session's branch.
        for command in &report.applied {
            if let CommandKind::CreateBranch { name } = &command.kind {
                self.state.repo.branch = name.clone();
            }
        }

        let applied = report.applied.len();
        match report.error {
            None => {
                self.emit(SessionEvent::QueueDrained { applied });
                format!("Back online - synced {applied} queued command(s)!")
            }
            Some(reason) => {
                self.emit(SessionEvent::QueueStalled {
                    applied,
                    remaining: report.remaining,
                    reason: reason.clone(),
                });
                format!(
                    "Back online, but syncing stalled: {reason}. Queued commands are kept for the next reconnect."
                )
            }
        }
    }

    fn handle_connect_repo(&mut self, name: String) -> String {
        let name = if name.trim().is_empty() {
            DEFAULT_REPO_NAME.to_string()
        } else {
            name
        };
        self.state.repo.connected = true;
        self.state.repo.repo_name = Some(name.clone());
        info!(repo = %name, branch = %self.state.repo.branch, "repository connected");
        format!("Connected to {name} on branch {}!", self.state.repo.branch)
    }

    /// Branch creation shares the push policy: apply online, queue offline.
    async fn handle_create_branch(&mut self, name: String) -> String {
        let kind = CommandKind::CreateBranch { name: name.clone() };
        if !self.state.online && self.state.repo.requires_connectivity(&kind) {
            let command = PendingCommand::new(kind, self.state.code.clone());
            self.state.pending.enqueue(command);
            self.emit(SessionEvent::CommandQueued {
                kind: "branch".to_string(),
                pending: self.state.pending.len(),
            });
            return "Offline - changes queued for sync".to_string();
        }

        match self.repo.create_branch(&name).await {
            Ok(()) => {
                self.state.repo.branch = name.clone();
                format!("Created branch {name}!")
            }
            Err(e) => format!("Branch didn't go through: {e}"),
        }
    }

    fn status(&self) -> DaemonStatus {
        DaemonStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: self.state.mode,
            online: self.state.online,
            pending_commands: self.state.pending.len(),
            summary: self.state.summary.status,
            repo_name: self.state.repo.repo_name.clone(),
            branch: self.state.repo.branch.clone(),
            recent_files: self
                .state
                .recent_files
                .iter()
                .map(|file| RecentFile {
                    name: file.name.clone(),
                    age_secs: file.created_at.elapsed().as_secs(),
                })
                .collect(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        let _ = self.event_tx.send(event);
    }
}
