//! Connection factory and connections handing out acknowledgers.
//!
//! A [`ConnectionFactory`] fixes the retry policy and prefetch size at
//! configuration time. Each [`Connection`] owns its own batch entry id
//! generator, shared by every acknowledger it creates.

use crate::acknowledge::{
    Acknowledger, BatchIdGenerator, BulkAction, BulkActionResult, MessageRetryMode,
    NegativeAcknowledger, PendingMessage, RetryMode,
};
use crate::backend::{MIN_BATCH, QueueBackend};
use crate::common::{AcknowledgeError, AcknowledgeResult};
use crate::settings::AcknowledgeSettings;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Builder for [`ConnectionFactory`].
///
/// Region and endpoint are mutually exclusive: setting one clears the other.
///
/// # Examples
///
/// ```no_run
/// use client::acknowledge::RetryMode;
/// use client::connection::ConnectionFactory;
/// # fn backend() -> std::sync::Arc<dyn client::backend::QueueBackend> { unimplemented!() }
///
/// let factory = ConnectionFactory::builder()
///     .with_region("eu-west-1")
///     .with_retry_mode(RetryMode::ExplicitDelay)
///     .with_retry_delay(30)
///     .with_backend(backend())
///     .build()?;
/// let connection = factory.create_connection();
/// # Ok::<(), client::common::AcknowledgeError>(())
/// ```
#[derive(Clone)]
pub struct ConnectionFactoryBuilder {
    region: Option<String>,
    endpoint: Option<String>,
    number_of_messages_to_prefetch: u32,
    retry_mode: RetryMode,
    retry_delay: i32,
    backend: Option<Arc<dyn QueueBackend>>,
}

impl Default for ConnectionFactoryBuilder {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            number_of_messages_to_prefetch: MIN_BATCH,
            retry_mode: RetryMode::DefaultDelay,
            retry_delay: 0,
            backend: None,
        }
    }
}

impl fmt::Debug for ConnectionFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionFactoryBuilder")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field(
                "number_of_messages_to_prefetch",
                &self.number_of_messages_to_prefetch,
            )
            .field("retry_mode", &self.retry_mode)
            .field("retry_delay", &self.retry_delay)
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

impl ConnectionFactoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self.endpoint = None;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.region = None;
        self
    }

    /// Zero is rejected by [`build`](Self::build).
    pub fn with_number_of_messages_to_prefetch(mut self, count: u32) -> Self {
        self.number_of_messages_to_prefetch = count;
        self
    }

    pub fn with_retry_mode(mut self, retry_mode: RetryMode) -> Self {
        self.retry_mode = retry_mode;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: i32) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn QueueBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Applies every value present in `settings`; values the settings leave
    /// out keep what the builder already holds. An endpoint in the settings
    /// wins over a region.
    pub fn with_settings(mut self, settings: &AcknowledgeSettings) -> Self {
        if let Some(retry_mode) = settings.configured_retry_mode() {
            self.retry_mode = retry_mode;
        }
        if let Some(retry_delay) = settings.configured_retry_delay() {
            self.retry_delay = retry_delay;
        }
        if let Some(count) = settings.configured_number_of_messages_to_prefetch() {
            self.number_of_messages_to_prefetch = count;
        }
        if let Some(region) = settings.region() {
            self = self.with_region(region);
        }
        if let Some(endpoint) = settings.endpoint() {
            self = self.with_endpoint(endpoint);
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`AcknowledgeError::InvalidConfiguration`] if the prefetch size
    /// is zero or no backend was supplied.
    pub fn build(self) -> AcknowledgeResult<ConnectionFactory> {
        if self.number_of_messages_to_prefetch < MIN_BATCH {
            return Err(AcknowledgeError::InvalidConfiguration(
                "Invalid prefetch size.".to_string(),
            ));
        }
        let backend = self.backend.ok_or_else(|| {
            AcknowledgeError::InvalidConfiguration("Queue backend is required".to_string())
        })?;

        if self.retry_mode == RetryMode::ExplicitDelay && self.retry_delay < 0 {
            log::warn!(
                "Negative retry delay {} will be treated as immediate redelivery",
                self.retry_delay
            );
        }

        Ok(ConnectionFactory {
            region: self.region,
            endpoint: self.endpoint,
            number_of_messages_to_prefetch: self.number_of_messages_to_prefetch,
            retry_mode: MessageRetryMode::new(self.retry_mode, self.retry_delay),
            backend,
        })
    }
}

/// Creates connections sharing one backend and one retry policy.
#[derive(Clone)]
pub struct ConnectionFactory {
    region: Option<String>,
    endpoint: Option<String>,
    number_of_messages_to_prefetch: u32,
    retry_mode: MessageRetryMode,
    backend: Arc<dyn QueueBackend>,
}

impl fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionFactory")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field(
                "number_of_messages_to_prefetch",
                &self.number_of_messages_to_prefetch,
            )
            .field("retry_mode", &self.retry_mode)
            .finish()
    }
}

impl ConnectionFactory {
    pub fn builder() -> ConnectionFactoryBuilder {
        ConnectionFactoryBuilder::new()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn retry_mode(&self) -> MessageRetryMode {
        self.retry_mode
    }

    pub fn create_connection(&self) -> Connection {
        log::info!(
            "Creating connection (retry mode: {}, retry delay: {}, prefetch: {})",
            self.retry_mode.retry_mode(),
            self.retry_mode.retry_delay(),
            self.number_of_messages_to_prefetch
        );

        Connection {
            backend: Arc::clone(&self.backend),
            retry_mode: self.retry_mode,
            number_of_messages_to_prefetch: self.number_of_messages_to_prefetch,
            batch_id_generator: Arc::new(BatchIdGenerator::new()),
        }
    }
}

/// A connection's acknowledgement surface.
#[derive(Clone)]
pub struct Connection {
    backend: Arc<dyn QueueBackend>,
    retry_mode: MessageRetryMode,
    number_of_messages_to_prefetch: u32,
    batch_id_generator: Arc<BatchIdGenerator>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("retry_mode", &self.retry_mode)
            .field(
                "number_of_messages_to_prefetch",
                &self.number_of_messages_to_prefetch,
            )
            .field("next_batch_id", &self.batch_id_generator.peek())
            .finish()
    }
}

impl Connection {
    pub fn retry_mode(&self) -> MessageRetryMode {
        self.retry_mode
    }

    pub fn number_of_messages_to_prefetch(&self) -> u32 {
        self.number_of_messages_to_prefetch
    }

    pub fn negative_acknowledger(&self) -> NegativeAcknowledger {
        NegativeAcknowledger::with_batch_id_generator(
            Arc::clone(&self.backend),
            Arc::clone(&self.batch_id_generator),
            Some(self.retry_mode),
        )
    }

    pub fn acknowledger(&self) -> Acknowledger {
        Acknowledger::with_batch_id_generator(
            Arc::clone(&self.backend),
            Arc::clone(&self.batch_id_generator),
        )
    }

    /// Deletes every pending message of `queue_url`, draining `pending`.
    pub async fn acknowledge(
        &self,
        pending: &mut VecDeque<PendingMessage>,
        queue_url: &str,
    ) -> AcknowledgeResult<BulkActionResult> {
        self.acknowledger().bulk_action(pending, queue_url).await
    }

    /// Makes every pending message of `queue_url` redeliverable according to
    /// the connection's retry policy, draining `pending`.
    pub async fn negative_acknowledge(
        &self,
        pending: &mut VecDeque<PendingMessage>,
        queue_url: &str,
    ) -> AcknowledgeResult<BulkActionResult> {
        self.negative_acknowledger()
            .bulk_action(pending, queue_url)
            .await
    }
}
