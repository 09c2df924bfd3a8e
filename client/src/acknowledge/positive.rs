use super::dispatcher::BulkAction;
use super::types::{BatchIdGenerator, BatchOutcome};
use crate::backend::{BatchOperation, DeleteBatchEntry, QueueBackend};
use crate::common::{AcknowledgeError, AcknowledgeResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Acknowledges a group of messages by deleting them from their queue.
#[derive(Clone)]
pub struct Acknowledger {
    backend: Arc<dyn QueueBackend>,
    batch_id_generator: Arc<BatchIdGenerator>,
}

impl fmt::Debug for Acknowledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acknowledger")
            .field("next_batch_id", &self.batch_id_generator.peek())
            .finish()
    }
}

impl Acknowledger {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self::with_batch_id_generator(backend, BatchIdGenerator::shared())
    }

    pub fn with_batch_id_generator(
        backend: Arc<dyn QueueBackend>,
        batch_id_generator: Arc<BatchIdGenerator>,
    ) -> Self {
        Self {
            backend,
            batch_id_generator,
        }
    }
}

#[async_trait]
impl BulkAction for Acknowledger {
    async fn action(
        &self,
        queue_url: &str,
        receipt_handles: &[String],
    ) -> AcknowledgeResult<BatchOutcome> {
        if receipt_handles.is_empty() {
            return Ok(BatchOutcome::Empty);
        }

        let entries: Vec<DeleteBatchEntry> = receipt_handles
            .iter()
            .map(|receipt_handle| DeleteBatchEntry {
                id: self.batch_id_generator.next_id(),
                receipt_handle: receipt_handle.clone(),
            })
            .collect();

        let response = self
            .backend
            .delete_message_batch(queue_url, entries)
            .await
            .map_err(|e| {
                AcknowledgeError::backend_call_failed(BatchOperation::Delete, queue_url, e)
            })?;

        for failure in &response.failed {
            log::warn!("Failed to delete message on {}: {}", queue_url, failure);
        }

        Ok(BatchOutcome::Submitted(response))
    }
}
