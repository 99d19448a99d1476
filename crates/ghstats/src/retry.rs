//! Retry schedule for REST resources that are still being computed.
//!
//! GitHub answers some statistics endpoints with `202 Accepted` until the
//! data has been generated server-side. Those requests are retried on a
//! fixed delay for a bounded number of attempts.

use std::time::Duration;

use backon::ConstantBuilder;

/// Delay between attempts while a resource is still processing.
pub const REST_RETRY_DELAY_SECS: u64 = 2;

/// Total attempts (first request included) before giving up on a resource.
pub const REST_MAX_ATTEMPTS: usize = 60;

/// Configuration for the fixed-delay retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay between attempts.
    pub delay: Duration,
    /// Total number of attempts, the first one included.
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(REST_RETRY_DELAY_SECS),
            max_attempts: REST_MAX_ATTEMPTS,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    ///
    /// `max_attempts` is raised to one: a request is always tried once.
    #[must_use]
    pub fn new(delay: Duration, max_attempts: usize) -> Self {
        Self {
            delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Build the constant backoff strategy for this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries())
    }
}
