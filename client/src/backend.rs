//! Backend batch API consumed by the acknowledgement engine.
//!
//! The engine never talks to the network itself. Transports implement
//! [`QueueBackend`] and receive fully built batches that already respect
//! [`MAX_BATCH`]. The request and response types serialize with the field
//! names of the backend's JSON protocol so a transport can pass them through.

use crate::common::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of entries the backend accepts in one batch call.
pub const MAX_BATCH: usize = 10;

/// Smallest meaningful prefetch size for a consumer.
pub const MIN_BATCH: u32 = 1;

/// The two batch operations issued by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchOperation {
    /// Negative acknowledgement: adjust the visibility timeout.
    ChangeMessageVisibility,
    /// Acknowledgement: remove the message from the queue.
    Delete,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOperation::ChangeMessageVisibility => write!(f, "ChangeMessageVisibilityBatch"),
            BatchOperation::Delete => write!(f, "DeleteMessageBatch"),
        }
    }
}

/// One entry of a visibility-change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VisibilityBatchEntry {
    /// Request-scoped entry id, unique within the batch
    pub id: String,
    pub receipt_handle: String,
    /// New visibility timeout in seconds
    pub visibility_timeout: u32,
}

/// One entry of a delete batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteBatchEntry {
    pub id: String,
    pub receipt_handle: String,
}

/// A batch addressed to a single queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchRequest<E> {
    pub queue_url: String,
    pub entries: Vec<E>,
}

impl<E: Serialize> BatchRequest<E> {
    pub fn new(queue_url: impl Into<String>, entries: Vec<E>) -> Self {
        Self {
            queue_url: queue_url.into(),
            entries,
        }
    }

    /// Renders the request body in the backend's JSON protocol.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Backend-reported failure of a single batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchEntryFailure {
    /// Entry id from the request
    pub id: String,
    /// Backend error code, e.g. `ReceiptHandleIsInvalid`
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    /// `true` when the backend blames the request rather than itself
    #[serde(default)]
    pub sender_fault: bool,
}

impl fmt::Display for BatchEntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}: {}", self.id, self.code)?;
        if let Some(message) = &self.message {
            write!(f, " - {message}")?;
        }
        Ok(())
    }
}

/// Per-entry outcome of an accepted batch call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResponse {
    /// Ids of entries the backend applied
    pub successful: Vec<String>,
    /// Entries the backend rejected individually
    pub failed: Vec<BatchEntryFailure>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BatchResponseWire {
    #[serde(default)]
    successful: Vec<SuccessfulEntryWire>,
    #[serde(default)]
    failed: Vec<BatchEntryFailure>,
}

#[derive(Deserialize)]
struct SuccessfulEntryWire {
    #[serde(rename = "Id")]
    id: String,
}

impl BatchResponse {
    /// A response in which every listed entry succeeded.
    pub fn all_successful<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            successful: ids.into_iter().map(Into::into).collect(),
            failed: Vec::new(),
        }
    }

    /// Parses a batch result body from the backend's JSON protocol.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let wire: BatchResponseWire = serde_json::from_str(body)?;
        Ok(Self {
            successful: wire.successful.into_iter().map(|entry| entry.id).collect(),
            failed: wire.failed,
        })
    }

    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Batch RPCs of the queue backend.
///
/// Implementations perform exactly one remote call per method invocation and
/// must not retry internally on behalf of the engine. A transport-wide failure
/// is returned as `Err`; individual entry failures go into [`BatchResponse`].
///
/// # Examples
///
/// ```no_run
/// use async_trait::async_trait;
/// use client::backend::{BatchResponse, DeleteBatchEntry, QueueBackend, VisibilityBatchEntry};
/// use client::common::BackendError;
///
/// struct NoopBackend;
///
/// #[async_trait]
/// impl QueueBackend for NoopBackend {
///     async fn change_message_visibility_batch(
///         &self,
///         _queue_url: &str,
///         entries: Vec<VisibilityBatchEntry>,
///     ) -> Result<BatchResponse, BackendError> {
///         Ok(BatchResponse::all_successful(entries.into_iter().map(|e| e.id)))
///     }
///
///     async fn delete_message_batch(
///         &self,
///         _queue_url: &str,
///         entries: Vec<DeleteBatchEntry>,
///     ) -> Result<BatchResponse, BackendError> {
///         Ok(BatchResponse::all_successful(entries.into_iter().map(|e| e.id)))
///     }
/// }
/// ```
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Changes the visibility timeout of up to [`MAX_BATCH`] messages.
    async fn change_message_visibility_batch(
        &self,
        queue_url: &str,
        entries: Vec<VisibilityBatchEntry>,
    ) -> Result<BatchResponse, BackendError>;

    /// Deletes up to [`MAX_BATCH`] messages.
    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteBatchEntry>,
    ) -> Result<BatchResponse, BackendError>;
}
