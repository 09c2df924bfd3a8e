//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use client::acknowledge::PendingMessage;
use client::backend::{
    BatchEntryFailure, BatchRequest, BatchResponse, DeleteBatchEntry, QueueBackend,
    VisibilityBatchEntry,
};
use client::common::BackendError;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ChangeVisibility {
        queue_url: String,
        entries: Vec<VisibilityBatchEntry>,
    },
    Delete {
        queue_url: String,
        entries: Vec<DeleteBatchEntry>,
    },
}

/// In-memory backend that records every batch call it receives.
///
/// Calls are recorded before the configured failure is returned, so a failed
/// call is still observable as issued.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on_call: Option<(usize, BackendError)>,
    rejected_handles: HashSet<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `call`-th batch call (1-based) with `error`.
    pub fn failing_on_call(call: usize, error: BackendError) -> Self {
        Self {
            fail_on_call: Some((call, error)),
            ..Default::default()
        }
    }

    /// Reports entries carrying any of these receipt handles as failed.
    pub fn rejecting<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rejected_handles: handles.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn visibility_batches(&self) -> Vec<Vec<VisibilityBatchEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::ChangeVisibility { entries, .. } => Some(entries),
                RecordedCall::Delete { .. } => None,
            })
            .collect()
    }

    pub fn delete_batches(&self) -> Vec<Vec<DeleteBatchEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Delete { entries, .. } => Some(entries),
                RecordedCall::ChangeVisibility { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedCall) -> Result<(), BackendError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        match &self.fail_on_call {
            Some((n, error)) if *n == calls.len() => Err(error.clone()),
            _ => Ok(()),
        }
    }

    fn respond<'a>(&self, entries: impl Iterator<Item = (&'a str, &'a str)>) -> BatchResponse {
        let mut response = BatchResponse::default();
        for (id, receipt_handle) in entries {
            if self.rejected_handles.contains(receipt_handle) {
                response.failed.push(BatchEntryFailure {
                    id: id.to_string(),
                    code: "ReceiptHandleIsInvalid".to_string(),
                    message: Some(format!("The receipt handle {receipt_handle} is not valid")),
                    sender_fault: true,
                });
            } else {
                response.successful.push(id.to_string());
            }
        }
        response
    }
}

#[async_trait]
impl QueueBackend for RecordingBackend {
    async fn change_message_visibility_batch(
        &self,
        queue_url: &str,
        entries: Vec<VisibilityBatchEntry>,
    ) -> Result<BatchResponse, BackendError> {
        self.record(RecordedCall::ChangeVisibility {
            queue_url: queue_url.to_string(),
            entries: entries.clone(),
        })?;
        Ok(self.respond(
            entries
                .iter()
                .map(|e| (e.id.as_str(), e.receipt_handle.as_str())),
        ))
    }

    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteBatchEntry>,
    ) -> Result<BatchResponse, BackendError> {
        self.record(RecordedCall::Delete {
            queue_url: queue_url.to_string(),
            entries: entries.clone(),
        })?;
        Ok(self.respond(
            entries
                .iter()
                .map(|e| (e.id.as_str(), e.receipt_handle.as_str())),
        ))
    }
}

pub fn pending_messages(count: usize, queue_url: &str) -> VecDeque<PendingMessage> {
    (0..count)
        .map(|i| PendingMessage::new(format!("rh-{i}"), queue_url).with_message_id(format!("m-{i}")))
        .collect()
}

/// Backend that talks the JSON batch protocol: it renders each request body
/// and answers with a response body parsed back into a [`BatchResponse`].
///
/// Entries whose receipt handle starts with `expired-` are reported failed.
#[derive(Default)]
pub struct JsonBackend {
    bodies: Mutex<Vec<String>>,
}

impl JsonBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    fn exchange<E: Serialize>(
        &self,
        queue_url: &str,
        entries: Vec<E>,
        ids_and_handles: Vec<(String, String)>,
    ) -> Result<BatchResponse, BackendError> {
        let body = BatchRequest::new(queue_url, entries)
            .to_json()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        self.bodies.lock().unwrap().push(body);

        let (failed, successful): (Vec<_>, Vec<_>) = ids_and_handles
            .into_iter()
            .partition(|(_, handle)| handle.starts_with("expired-"));
        let response = serde_json::json!({
            "Successful": successful
                .iter()
                .map(|(id, _)| serde_json::json!({ "Id": id }))
                .collect::<Vec<_>>(),
            "Failed": failed
                .iter()
                .map(|(id, _)| serde_json::json!({
                    "Id": id,
                    "Code": "ReceiptHandleIsInvalid",
                    "Message": "receipt handle has expired",
                    "SenderFault": true,
                }))
                .collect::<Vec<_>>(),
        });

        BatchResponse::from_json(&response.to_string())
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl QueueBackend for JsonBackend {
    async fn change_message_visibility_batch(
        &self,
        queue_url: &str,
        entries: Vec<VisibilityBatchEntry>,
    ) -> Result<BatchResponse, BackendError> {
        let ids_and_handles = entries
            .iter()
            .map(|e| (e.id.clone(), e.receipt_handle.clone()))
            .collect();
        self.exchange(queue_url, entries, ids_and_handles)
    }

    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteBatchEntry>,
    ) -> Result<BatchResponse, BackendError> {
        let ids_and_handles = entries
            .iter()
            .map(|e| (e.id.clone(), e.receipt_handle.clone()))
            .collect();
        self.exchange(queue_url, entries, ids_and_handles)
    }
}
