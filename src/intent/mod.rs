//! Voice intent classification
//!
//! Maps raw transcripts to typed intents through a fixed, ordered
//! rule table. Matching is deliberately simple substring search so
//! outcomes stay deterministic and testable.

mod classify;

pub use classify::{classify, Intent};
