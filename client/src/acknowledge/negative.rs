use super::dispatcher::BulkAction;
use super::retry_mode::{MessageRetryMode, VisibilityDelay, resolve_delay};
use super::types::{BatchIdGenerator, BatchOutcome};
use crate::backend::{BatchOperation, QueueBackend, VisibilityBatchEntry};
use crate::common::{AcknowledgeError, AcknowledgeResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Negative acknowledgement of a group of messages.
///
/// Changes the visibility timeout of the messages according to the configured
/// [`MessageRetryMode`] so they become available for redelivery. Mostly used
/// on session recover and close. Negative acknowledgement can cause duplicate
/// deliveries.
#[derive(Clone)]
pub struct NegativeAcknowledger {
    backend: Arc<dyn QueueBackend>,
    batch_id_generator: Arc<BatchIdGenerator>,
    retry_mode: Option<MessageRetryMode>,
}

impl fmt::Debug for NegativeAcknowledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegativeAcknowledger")
            .field("retry_mode", &self.retry_mode)
            .field("next_batch_id", &self.batch_id_generator.peek())
            .finish()
    }
}

impl NegativeAcknowledger {
    /// Creates an acknowledger drawing entry ids from the process-wide generator.
    pub fn new(backend: Arc<dyn QueueBackend>, retry_mode: Option<MessageRetryMode>) -> Self {
        Self::with_batch_id_generator(backend, BatchIdGenerator::shared(), retry_mode)
    }

    pub fn with_batch_id_generator(
        backend: Arc<dyn QueueBackend>,
        batch_id_generator: Arc<BatchIdGenerator>,
        retry_mode: Option<MessageRetryMode>,
    ) -> Self {
        Self {
            backend,
            batch_id_generator,
            retry_mode,
        }
    }

    pub fn retry_mode(&self) -> Option<&MessageRetryMode> {
        self.retry_mode.as_ref()
    }

    fn visibility_delay(&self, queue_url: &str) -> VisibilityDelay {
        match &self.retry_mode {
            Some(policy) => log::debug!(
                "NegativeAcknowledger retry mode: {}, retry delay: {}, queue: {}",
                policy.retry_mode(),
                policy.retry_delay(),
                queue_url
            ),
            None => log::warn!(
                "NegativeAcknowledger has no retry mode, using immediate redelivery for queue: {}",
                queue_url
            ),
        }
        resolve_delay(self.retry_mode.as_ref())
    }
}

#[async_trait]
impl BulkAction for NegativeAcknowledger {
    async fn action(
        &self,
        queue_url: &str,
        receipt_handles: &[String],
    ) -> AcknowledgeResult<BatchOutcome> {
        if receipt_handles.is_empty() {
            return Ok(BatchOutcome::Empty);
        }

        // Evaluated once per batch: every entry in the call shares the delay.
        let visibility_timeout = match self.visibility_delay(queue_url) {
            VisibilityDelay::Seconds(seconds) => seconds,
            VisibilityDelay::QueueDefault => {
                log::debug!(
                    "Leaving {} messages on {} with the queue visibility timeout",
                    receipt_handles.len(),
                    queue_url
                );
                return Ok(BatchOutcome::Skipped {
                    count: receipt_handles.len(),
                });
            }
        };

        let entries: Vec<VisibilityBatchEntry> = receipt_handles
            .iter()
            .map(|receipt_handle| VisibilityBatchEntry {
                id: self.batch_id_generator.next_id(),
                receipt_handle: receipt_handle.clone(),
                visibility_timeout,
            })
            .collect();

        let response = self
            .backend
            .change_message_visibility_batch(queue_url, entries)
            .await
            .map_err(|e| {
                AcknowledgeError::backend_call_failed(
                    BatchOperation::ChangeMessageVisibility,
                    queue_url,
                    e,
                )
            })?;

        for failure in &response.failed {
            log::warn!(
                "Failed to change visibility on {}: {}",
                queue_url,
                failure
            );
        }

        Ok(BatchOutcome::Submitted(response))
    }
}
