//! codedrive-daemon: session core for the CodeDrive voice assistant
//!
//! The daemon owns the voice-driven session: transcripts arrive over
//! IPC, are classified into intents, and drive one of three modes
//! (code editing, TL;DR summarization, GitHub sync). Connectivity-
//! requiring commands queue while offline and replay when the
//! connection returns; summary fragments stream in from producer tasks
//! and assemble into a final artifact. The front-end owns microphone,
//! audio playback, and pixels.

mod config;
mod connectivity;
mod events;
mod intent;
mod ipc;
mod lifecycle;
mod session;
mod speech;
mod summary;
mod sync;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::SessionEvent;
use crate::ipc::Server;
use crate::session::Orchestrator;
use crate::speech::EventSpeech;
use crate::summary::{ChunkSummarizer, MemoryTransport, SummarySignal};
use crate::sync::SimulatedRepo;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "codedrive-daemon starting"
    );

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, "configuration loaded");

    // Front-end requests -> orchestrator
    let (session_tx, session_rx) = mpsc::channel(32);
    // Summarizer producer tasks -> orchestrator
    let (summary_tx, summary_rx) = mpsc::channel::<SummarySignal>(32);
    // Orchestrator -> IPC subscribers
    let (event_tx, _event_rx) = broadcast::channel::<SessionEvent>(64);

    let mut orchestrator = Orchestrator::new(
        Box::new(EventSpeech::new(event_tx.clone())),
        Arc::new(SimulatedRepo::default()),
        Arc::new(MemoryTransport::default()),
        Arc::new(ChunkSummarizer::default()),
        config.speech,
        event_tx.clone(),
        summary_tx,
    );

    let server = Server::new(&config.socket_path, session_tx, event_tx)?;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = orchestrator.run(session_rx, summary_rx) => {
            info!("orchestrator exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = lifecycle::wait_for_shutdown() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");
    server.shutdown().await;
    info!("codedrive-daemon stopped");

    Ok(())
}
