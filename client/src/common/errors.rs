use crate::backend::BatchOperation;
use thiserror::Error;

/// Failures reported by a [`QueueBackend`](crate::backend::QueueBackend) for a whole batch call.
///
/// These describe conditions where the backend rejected or never processed the
/// request at all (connectivity, authorization, throttling). Per-entry failures
/// inside an otherwise accepted batch are not errors; they are reported through
/// [`BatchResponse::failed`](crate::backend::BatchResponse::failed).
///
/// # Recovery
///
/// The acknowledgement engine never retries. [`BackendError::is_retryable`]
/// is provided for the session-level recovery logic that owns retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Network or protocol level failure before a response was received.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The backend throttled the caller.
    #[error("Request throttled: retry after {retry_after_secs}s")]
    Throttled { retry_after_secs: u64 },

    /// Credentials were rejected or lack permission on the destination.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend rejected the request as malformed (too many entries,
    /// duplicate entry ids, unknown queue).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Whether resubmitting the same batch later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::Transport(_) | BackendError::Throttled { .. }
        )
    }
}

/// Errors surfaced to the application from acknowledge / negative acknowledge
/// operations and from connection configuration.
#[derive(Debug, Error)]
pub enum AcknowledgeError {
    /// A batch call failed as a whole. Chunks flushed before this one were
    /// already applied by the backend and are not rolled back.
    #[error("{operation} failed for queue {queue_url}: {source}")]
    BackendCallFailed {
        operation: BatchOperation,
        queue_url: String,
        #[source]
        source: BackendError,
    },

    /// A pending message belongs to a different queue than the one being
    /// dispatched to. Raised before any backend call is issued.
    #[error("Pending message from queue {found} cannot be dispatched to queue {expected}")]
    DestinationMismatch { expected: String, found: String },

    /// Builder or settings validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AcknowledgeError {
    pub fn backend_call_failed(
        operation: BatchOperation,
        queue_url: impl Into<String>,
        source: BackendError,
    ) -> Self {
        Self::BackendCallFailed {
            operation,
            queue_url: queue_url.into(),
            source,
        }
    }

    /// The underlying backend failure, if this error came from a batch call.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            AcknowledgeError::BackendCallFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for AcknowledgeError {
    fn from(err: config::ConfigError) -> Self {
        AcknowledgeError::InvalidConfiguration(err.to_string())
    }
}

pub type AcknowledgeResult<T> = Result<T, AcknowledgeError>;
