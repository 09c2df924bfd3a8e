//! Acknowledgement settings loaded from a TOML file and the environment.
//!
//! Environment variables use the `ACK` prefix and `__` as separator, e.g.
//! `ACK__RETRY_MODE=explicit_delay` and `ACK__RETRY_DELAY=30`. Environment
//! entries override file values.

use crate::acknowledge::{MessageRetryMode, RetryMode};
use crate::backend::MIN_BATCH;
use crate::common::AcknowledgeResult;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

pub const ENV_PREFIX: &str = "ACK";

/// Connection-level settings consumed by the acknowledgement engine.
///
/// Every field is optional. The plain accessors fall back to defaults; the
/// `configured_*` accessors report only what the sources actually set.
///
/// # Examples
///
/// ```no_run
/// use client::settings::AcknowledgeSettings;
///
/// let settings = AcknowledgeSettings::from_toml_str(
///     r#"
///     retry_mode = "explicit_delay"
///     retry_delay = 30
///     "#,
/// )?;
/// println!("Retry policy: {:?}", settings.message_retry_mode());
/// # Ok::<(), client::common::AcknowledgeError>(())
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AcknowledgeSettings {
    /// Retry mode for negative acknowledgement (default: default_delay)
    retry_mode: Option<RetryMode>,
    /// Delay in seconds for explicit_delay mode (default: 0)
    retry_delay: Option<i32>,
    /// Consumer prefetch size (default: 1)
    number_of_messages_to_prefetch: Option<u32>,
    region: Option<String>,
    endpoint: Option<String>,
}

impl AcknowledgeSettings {
    /// Loads settings from an optional file, then applies `ACK__*` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AcknowledgeError::InvalidConfiguration`](crate::common::AcknowledgeError::InvalidConfiguration)
    /// if the file cannot be read or a value does not deserialize.
    pub fn load(path: Option<&Path>) -> AcknowledgeResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            log::debug!("Loading acknowledgement settings from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parses settings from TOML text without consulting the environment.
    pub fn from_toml_str(source: &str) -> AcknowledgeResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn retry_mode(&self) -> RetryMode {
        self.retry_mode.unwrap_or_default()
    }

    pub fn retry_delay(&self) -> i32 {
        self.retry_delay.unwrap_or(0)
    }

    pub fn message_retry_mode(&self) -> MessageRetryMode {
        MessageRetryMode::new(self.retry_mode(), self.retry_delay())
    }

    pub fn number_of_messages_to_prefetch(&self) -> u32 {
        self.number_of_messages_to_prefetch.unwrap_or(MIN_BATCH)
    }

    pub fn configured_retry_mode(&self) -> Option<RetryMode> {
        self.retry_mode
    }

    pub fn configured_retry_delay(&self) -> Option<i32> {
        self.retry_delay
    }

    pub fn configured_number_of_messages_to_prefetch(&self) -> Option<u32> {
        self.number_of_messages_to_prefetch
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}
