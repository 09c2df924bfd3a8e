//! Types shared by the acknowledgement paths.
//!
//! This module defines the pending message handed over by the prefetch layer,
//! the batch entry id generator, and the result tracking returned from bulk
//! dispatch.

use crate::backend::{BatchEntryFailure, BatchResponse};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static DEFAULT_BATCH_ID_GENERATOR: Lazy<Arc<BatchIdGenerator>> =
    Lazy::new(|| Arc::new(BatchIdGenerator::new()));

/// A received message that still awaits an acknowledge decision.
///
/// Ownership moves from the prefetch queue to the dispatcher, which consumes
/// each pending message exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Backend-issued handle for this delivery
    pub receipt_handle: String,
    /// Queue the message was received from
    pub queue_url: String,
    /// Message id, used for log context only
    pub message_id: Option<String>,
}

impl PendingMessage {
    pub fn new(receipt_handle: impl Into<String>, queue_url: impl Into<String>) -> Self {
        Self {
            receipt_handle: receipt_handle.into(),
            queue_url: queue_url.into(),
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

/// Monotonic source of batch entry ids.
///
/// The backend only requires ids to be unique within one request; drawing
/// them from a strictly increasing counter satisfies that for every batch and
/// is safe to share between concurrently acknowledging sessions.
#[derive(Debug, Default)]
pub struct BatchIdGenerator {
    next: AtomicU64,
}

impl BatchIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Process-wide generator used by acknowledgers created without one.
    pub fn shared() -> Arc<BatchIdGenerator> {
        Arc::clone(&DEFAULT_BATCH_ID_GENERATOR)
    }

    /// Returns the next entry id and advances the counter.
    pub fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Value the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Result of a single per-chunk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No receipt handles were given; nothing was sent.
    Empty,
    /// The retry policy defers to the queue's visibility timeout; `count`
    /// messages were handled without a backend call.
    Skipped { count: usize },
    /// One backend call was issued with the given per-entry outcome.
    Submitted(BatchResponse),
}

/// Aggregated outcome of a bulk dispatch across all chunks.
///
/// Partial failures are reported here rather than raised; re-queueing the
/// failed entries is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkActionResult {
    /// Messages drained from the pending queue
    pub total_requested: usize,
    /// Entries the backend applied
    pub successful: usize,
    /// Messages handled without a backend call (queue delay mode)
    pub skipped: usize,
    /// Entries the backend rejected individually
    pub failed: Vec<BatchEntryFailure>,
    /// Number of backend calls issued
    pub batches_sent: usize,
}

impl BulkActionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one chunk of `chunk_len` messages into the totals.
    pub fn record(&mut self, chunk_len: usize, outcome: BatchOutcome) {
        self.total_requested += chunk_len;
        match outcome {
            BatchOutcome::Empty => {}
            BatchOutcome::Skipped { count } => {
                self.skipped += count;
            }
            BatchOutcome::Submitted(response) => {
                self.batches_sent += 1;
                self.successful += response.successful.len();
                self.failed.extend(response.failed);
            }
        }
    }

    /// `true` if no entry was rejected by the backend.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}
