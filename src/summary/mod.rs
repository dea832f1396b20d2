//! Streaming summary assembly and its collaborator seams
//!
//! One summary slot per session with last-request-wins semantics:
//! restarting the slot abandons the in-flight request and its late
//! fragments are dropped on arrival.

mod consumer;
mod service;

pub use consumer::{FileId, SummaryState, SummaryStatus};
pub use service::{
    ChunkSummarizer, FileTransport, LocationRef, MemoryTransport, SummaryError, SummaryPayload,
    SummaryProvider, SummarySignal, TransportError,
};
