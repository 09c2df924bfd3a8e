//! Retry policy applied when a message is negatively acknowledged.

use serde::Deserialize;
use std::fmt;

/// Visibility timeout used when no explicit delay applies: the message is
/// redeliverable immediately.
pub const NACK_TIMEOUT: u32 = 0;

/// How a negative acknowledgement affects redelivery.
///
/// - [`RetryMode::DefaultDelay`] resets the visibility timeout to
///   [`NACK_TIMEOUT`] so the message is retried immediately.
/// - [`RetryMode::ExplicitDelay`] sets the visibility timeout to the configured
///   retry delay.
/// - [`RetryMode::QueueDelay`] leaves the visibility timeout configured on the
///   queue untouched; no backend call is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    #[default]
    #[serde(alias = "RETRY_MODE_DEFAULT_DELAY")]
    DefaultDelay,
    #[serde(alias = "RETRY_MODE_EXPLICIT_DELAY")]
    ExplicitDelay,
    #[serde(alias = "RETRY_MODE_QUEUE_DELAY")]
    QueueDelay,
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryMode::DefaultDelay => write!(f, "default_delay"),
            RetryMode::ExplicitDelay => write!(f, "explicit_delay"),
            RetryMode::QueueDelay => write!(f, "queue_delay"),
        }
    }
}

/// Outcome of resolving a retry policy for one negative acknowledgement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityDelay {
    /// Change the visibility timeout to this many seconds.
    Seconds(u32),
    /// Keep the queue's own visibility timeout; issue no backend call.
    QueueDefault,
}

/// Immutable retry policy shared by every negative acknowledger of a connection.
///
/// # Examples
///
/// ```no_run
/// use client::acknowledge::{MessageRetryMode, VisibilityDelay};
///
/// let policy = MessageRetryMode::explicit_delay(30);
/// assert_eq!(policy.resolve_delay(), VisibilityDelay::Seconds(30));
///
/// let policy = MessageRetryMode::queue_delay();
/// assert_eq!(policy.resolve_delay(), VisibilityDelay::QueueDefault);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageRetryMode {
    retry_mode: RetryMode,
    retry_delay: i32,
}

impl MessageRetryMode {
    /// `retry_delay` is only consulted in [`RetryMode::ExplicitDelay`]; a
    /// negative value is kept as given and clamped at resolution time.
    pub fn new(retry_mode: RetryMode, retry_delay: i32) -> Self {
        Self {
            retry_mode,
            retry_delay,
        }
    }

    pub fn default_delay() -> Self {
        Self::new(RetryMode::DefaultDelay, 0)
    }

    pub fn explicit_delay(retry_delay: i32) -> Self {
        Self::new(RetryMode::ExplicitDelay, retry_delay)
    }

    pub fn queue_delay() -> Self {
        Self::new(RetryMode::QueueDelay, 0)
    }

    pub fn retry_mode(&self) -> RetryMode {
        self.retry_mode
    }

    pub fn retry_delay(&self) -> i32 {
        self.retry_delay
    }

    pub fn resolve_delay(&self) -> VisibilityDelay {
        match self.retry_mode {
            RetryMode::DefaultDelay => VisibilityDelay::Seconds(NACK_TIMEOUT),
            RetryMode::ExplicitDelay => VisibilityDelay::Seconds(
                u32::try_from(self.retry_delay).unwrap_or(NACK_TIMEOUT),
            ),
            RetryMode::QueueDelay => VisibilityDelay::QueueDefault,
        }
    }
}

/// Resolves an optional policy; an unset policy behaves like
/// [`RetryMode::DefaultDelay`].
pub fn resolve_delay(policy: Option<&MessageRetryMode>) -> VisibilityDelay {
    policy
        .map(MessageRetryMode::resolve_delay)
        .unwrap_or(VisibilityDelay::Seconds(NACK_TIMEOUT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_resolution_table() {
        assert_eq!(
            MessageRetryMode::default_delay().resolve_delay(),
            VisibilityDelay::Seconds(0)
        );
        assert_eq!(
            MessageRetryMode::explicit_delay(15).resolve_delay(),
            VisibilityDelay::Seconds(15)
        );
        assert_eq!(
            MessageRetryMode::explicit_delay(-5).resolve_delay(),
            VisibilityDelay::Seconds(0)
        );
        assert_eq!(
            MessageRetryMode::queue_delay().resolve_delay(),
            VisibilityDelay::QueueDefault
        );
    }

    #[test]
    fn test_unset_policy_defaults_to_immediate_retry() {
        assert_eq!(resolve_delay(None), VisibilityDelay::Seconds(NACK_TIMEOUT));
        let policy = MessageRetryMode::explicit_delay(45);
        assert_eq!(resolve_delay(Some(&policy)), VisibilityDelay::Seconds(45));
    }

    #[test]
    fn test_delay_ignored_outside_explicit_mode() {
        let policy = MessageRetryMode::new(RetryMode::DefaultDelay, 120);
        assert_eq!(policy.resolve_delay(), VisibilityDelay::Seconds(0));
        assert_eq!(policy.retry_delay(), 120);

        let policy = MessageRetryMode::new(RetryMode::QueueDelay, 120);
        assert_eq!(policy.resolve_delay(), VisibilityDelay::QueueDefault);
    }

    #[test]
    fn test_default_policy() {
        let policy = MessageRetryMode::default();
        assert_eq!(policy.retry_mode(), RetryMode::DefaultDelay);
        assert_eq!(policy.retry_delay(), 0);
    }

    #[test]
    fn test_retry_mode_display_matches_settings_names() {
        assert_eq!(RetryMode::DefaultDelay.to_string(), "default_delay");
        assert_eq!(RetryMode::ExplicitDelay.to_string(), "explicit_delay");
        assert_eq!(RetryMode::QueueDelay.to_string(), "queue_delay");
    }

    #[test]
    fn test_retry_mode_deserializes_both_spellings() {
        let mode: RetryMode = serde_json::from_str(r#""queue_delay""#).unwrap();
        assert_eq!(mode, RetryMode::QueueDelay);
        let mode: RetryMode = serde_json::from_str(r#""RETRY_MODE_EXPLICIT_DELAY""#).unwrap();
        assert_eq!(mode, RetryMode::ExplicitDelay);
        assert!(serde_json::from_str::<RetryMode>(r#""backoff""#).is_err());
    }
}
