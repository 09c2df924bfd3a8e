//! Batched acknowledgement and negative acknowledgement.
//!
//! - `types`: pending messages, batch entry ids and result tracking
//! - `retry_mode`: retry policy for negative acknowledgement
//! - `dispatcher`: chunking of pending messages into backend-sized batches
//! - `negative`: visibility-change hook used on recover and close
//! - `positive`: delete hook used on acknowledge

pub mod dispatcher;
pub mod negative;
pub mod positive;
pub mod retry_mode;
pub mod types;

pub use dispatcher::BulkAction;
pub use negative::NegativeAcknowledger;
pub use positive::Acknowledger;
pub use retry_mode::{MessageRetryMode, NACK_TIMEOUT, RetryMode, VisibilityDelay, resolve_delay};
pub use types::{BatchIdGenerator, BatchOutcome, BulkActionResult, PendingMessage};
