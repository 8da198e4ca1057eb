//! Retry logic with exponential backoff
//!
//! The delay starts at `initial_delay` and doubles after every failed
//! attempt. There is no jitter and no cap: `max_retries = 3` with a
//! one-second start sleeps 1s, 2s, 4s and makes four calls in total.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry count
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set initial delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Total calls made when every attempt fails
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (zero-based)
    fn calculate_delay(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Execute an async operation, retrying every failure with backoff
///
/// Returns the first success, or the last error unchanged once the
/// retries are used up.
///
/// # Example
/// ```ignore
/// let reply = retry_with_backoff(&RetryConfig::default(), || provider.complete(req.clone())).await?;
/// ```
pub async fn retry_with_backoff<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if retry > 0 {
                    debug!(attempt = retry + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if retry < config.max_retries => {
                let delay = config.calculate_delay(retry);
                let retries_left = config.max_retries - retry;
                info!(
                    delay_ms = delay.as_millis() as u64,
                    retries_left,
                    error = %e,
                    "Retrying in {}ms... ({} retries left)",
                    delay.as_millis(),
                    retries_left
                );
                sleep(delay).await;
                retry += 1;
            }
            Err(e) => {
                debug!(attempts = retry + 1, error = %e, "Operation failed, no more retries");
                return Err(e);
            }
        }
    }
}
