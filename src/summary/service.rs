//! Upload transport and summarization producer seams
//!
//! Both collaborators are external services in production; the
//! implementations here stand in for them. The transport keeps
//! uploaded bytes in memory, and the summarizer narrates from file
//! metadata only (contents stay behind the transport).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::session::FileRecord;
use crate::summary::FileId;

/// Opaque handle to uploaded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef(pub String);

/// Failures surfaced by a file transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("file is empty")]
    EmptyFile,

    #[error("store rejected upload: {0}")]
    Rejected(String),
}

/// Moves file bytes out of the session and returns a handle to them
#[async_trait]
pub trait FileTransport: Send + Sync {
    async fn upload(&self, name: &str, contents: &[u8]) -> Result<LocationRef, TransportError>;
}

/// One unit of an incrementally delivered summary stream
#[derive(Debug, Clone)]
pub enum SummaryPayload {
    Fragment(String),
    Complete,
    Failed(String),
}

/// A signal from a summarization producer, tagged with its request
#[derive(Debug, Clone)]
pub struct SummarySignal {
    pub request: FileId,
    pub payload: SummaryPayload,
}

/// Failures surfaced by a summarization producer
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("summary stream closed early")]
    StreamClosed,
}

/// Produces an incremental fragment stream for an uploaded file
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Deliver fragments for `file` into `tx`, ending with `Complete`.
    async fn summarize(
        &self,
        file: &FileRecord,
        tx: mpsc::Sender<SummarySignal>,
    ) -> Result<(), SummaryError>;
}

/// In-memory transport backed by a map of location handles to bytes
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: Mutex<HashMap<String, Vec<u8>>>,
    next_slot: AtomicU64,
}

#[async_trait]
impl FileTransport for MemoryTransport {
    async fn upload(&self, name: &str, contents: &[u8]) -> Result<LocationRef, TransportError> {
        if contents.is_empty() {
            return Err(TransportError::EmptyFile);
        }

        let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
        let location = LocationRef(format!("mem://{slot}/{name}"));

        let mut store = self.store.lock().await;
        store.insert(location.0.clone(), contents.to_vec());
        debug!(location = %location.0, bytes = contents.len(), "upload stored");

        Ok(location)
    }
}

/// Summarizer that narrates from file metadata in listening-friendly chunks
pub struct ChunkSummarizer {
    /// Pause between fragments; zero makes the stream synchronous-fast
    pub fragment_delay: Duration,
}

impl Default for ChunkSummarizer {
    fn default() -> Self {
        Self {
            fragment_delay: Duration::from_millis(150),
        }
    }
}

#[async_trait]
impl SummaryProvider for ChunkSummarizer {
    async fn summarize(
        &self,
        file: &FileRecord,
        tx: mpsc::Sender<SummarySignal>,
    ) -> Result<(), SummaryError> {
        let fragments = [
            format!("Here's the quick version of {}. ", file.name),
            "It opens with the main idea, then the details that back it up. ".to_string(),
            "That's the TL;DR - say \"play\" any time to hear it again.".to_string(),
        ];

        for fragment in fragments {
            if !self.fragment_delay.is_zero() {
                tokio::time::sleep(self.fragment_delay).await;
            }
            tx.send(SummarySignal {
                request: file.id,
                payload: SummaryPayload::Fragment(fragment),
            })
            .await
            .map_err(|_| SummaryError::StreamClosed)?;
        }

        tx.send(SummarySignal {
            request: file.id,
            payload: SummaryPayload::Complete,
        })
        .await
        .map_err(|_| SummaryError::StreamClosed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn record(id: u64, name: &str) -> FileRecord {
        FileRecord {
            id: FileId(id),
            name: name.to_string(),
            location: LocationRef(format!("mem://test/{name}")),
            created_at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn transport_rejects_empty_files() {
        let transport = MemoryTransport::default();
        let result = transport.upload("empty.txt", &[]).await;
        assert!(matches!(result, Err(TransportError::EmptyFile)));
    }

    #[tokio::test]
    async fn transport_hands_out_distinct_locations() {
        let transport = MemoryTransport::default();
        let a = transport.upload("a.txt", b"aaa").await.unwrap();
        let b = transport.upload("a.txt", b"bbb").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn summarizer_streams_fragments_then_completes() {
        let summarizer = ChunkSummarizer {
            fragment_delay: Duration::ZERO,
        };
        let (tx, mut rx) = mpsc::channel(16);

        summarizer
            .summarize(&record(3, "notes.pdf"), tx)
            .await
            .unwrap();

        let mut fragments = Vec::new();
        let mut completed = false;
        while let Some(signal) = rx.recv().await {
            assert_eq!(signal.request, FileId(3));
            match signal.payload {
                SummaryPayload::Fragment(text) => fragments.push(text),
                SummaryPayload::Complete => {
                    completed = true;
                    break;
                }
                SummaryPayload::Failed(reason) => panic!("unexpected failure: {reason}"),
            }
        }

        assert!(completed);
        assert!(fragments.len() >= 2);
        assert!(fragments[0].contains("notes.pdf"));
    }

    #[tokio::test]
    async fn summarizer_reports_closed_stream() {
        let summarizer = ChunkSummarizer {
            fragment_delay: Duration::ZERO,
        };
        let (tx, rx) = mpsc::channel(16);
        drop(rx);

        let result = summarizer.summarize(&record(4, "gone.txt"), tx).await;
        assert!(matches!(result, Err(SummaryError::StreamClosed)));
    }
}
