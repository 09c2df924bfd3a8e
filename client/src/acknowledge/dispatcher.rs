use super::types::{BatchOutcome, BulkActionResult, PendingMessage};
use crate::backend::MAX_BATCH;
use crate::common::{AcknowledgeError, AcknowledgeResult};
use async_trait::async_trait;
use std::collections::VecDeque;

/// Chunked dispatch of pending messages to a per-batch backend action.
///
/// Implementors provide [`action`](BulkAction::action), which turns one chunk
/// of receipt handles into a single backend call. The provided
/// [`bulk_action`](BulkAction::bulk_action) drains a pending queue into chunks
/// of at most [`MAX_BATCH`] and calls `action` once per chunk.
#[async_trait]
pub trait BulkAction: Send + Sync {
    /// Applies the action to one chunk of receipt handles from `queue_url`.
    ///
    /// Must treat an empty slice as a no-op; the action may be called
    /// directly, not only through [`bulk_action`](BulkAction::bulk_action).
    async fn action(
        &self,
        queue_url: &str,
        receipt_handles: &[String],
    ) -> AcknowledgeResult<BatchOutcome>;

    /// Chunk size used by [`bulk_action`](BulkAction::bulk_action), clamped
    /// to `1..=MAX_BATCH`.
    fn max_batch_size(&self) -> usize {
        MAX_BATCH
    }

    /// Drains `pending` front to back and applies the action chunk by chunk.
    ///
    /// Chunks are flushed in queue order. If an action fails, the error is
    /// returned immediately: earlier chunks stay applied, the failed chunk is
    /// put back at the front of `pending` in its original order, and later
    /// messages are left untouched.
    ///
    /// # Errors
    ///
    /// - [`AcknowledgeError::DestinationMismatch`] if a pending message was
    ///   received from another queue; nothing is drained in that case.
    /// - Any error returned by [`action`](BulkAction::action).
    async fn bulk_action(
        &self,
        pending: &mut VecDeque<PendingMessage>,
        queue_url: &str,
    ) -> AcknowledgeResult<BulkActionResult> {
        if let Some(foreign) = pending.iter().find(|m| m.queue_url != queue_url) {
            return Err(AcknowledgeError::DestinationMismatch {
                expected: queue_url.to_string(),
                found: foreign.queue_url.clone(),
            });
        }

        let batch_size = self.max_batch_size().clamp(1, MAX_BATCH);
        let mut result = BulkActionResult::new();

        if pending.is_empty() {
            return Ok(result);
        }

        log::debug!(
            "Dispatching {} pending messages for {} in batches of {}",
            pending.len(),
            queue_url,
            batch_size
        );

        let mut chunk = Vec::with_capacity(batch_size);
        while let Some(message) = pending.pop_front() {
            chunk.push(message);

            if chunk.len() == batch_size {
                flush_chunk(self, queue_url, &mut chunk, pending, &mut result).await?;
            }
        }
        if !chunk.is_empty() {
            flush_chunk(self, queue_url, &mut chunk, pending, &mut result).await?;
        }

        log::debug!(
            "Dispatch for {} finished: {} successful, {} skipped, {} failed in {} calls",
            queue_url,
            result.successful,
            result.skipped,
            result.failed.len(),
            result.batches_sent
        );

        Ok(result)
    }
}

async fn flush_chunk<A: BulkAction + ?Sized>(
    action: &A,
    queue_url: &str,
    chunk: &mut Vec<PendingMessage>,
    pending: &mut VecDeque<PendingMessage>,
    result: &mut BulkActionResult,
) -> AcknowledgeResult<()> {
    let receipt_handles: Vec<String> = chunk.iter().map(|m| m.receipt_handle.clone()).collect();

    match action.action(queue_url, &receipt_handles).await {
        Ok(outcome) => {
            result.record(chunk.len(), outcome);
            chunk.clear();
            Ok(())
        }
        Err(e) => {
            log::warn!(
                "Batch of {} messages for {} failed, {} messages remain pending: {}",
                chunk.len(),
                queue_url,
                chunk.len() + pending.len(),
                e
            );
            for message in chunk.drain(..).rev() {
                pending.push_front(message);
            }
            Err(e)
        }
    }
}
