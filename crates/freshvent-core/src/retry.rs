//! Retry logic for whole-session operations.
//!
//! Retry operates at the snapshot level, not per characteristic: a
//! transient failure tears the whole session down and the next attempt
//! starts from a fresh connect. Classification lives on
//! [`Error::is_retryable`]; terminal errors (bad auth code, unsupported
//! device, codec violations) propagate immediately.
//!
//! # Example
//!
//! ```
//! use freshvent_core::{RetryConfig, with_retry, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::new(3);
//!
//! let value = with_retry(&config, "read_sensor", || async {
//!     // Your fallible operation here
//!     Ok::<_, Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (1 means no retries).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 = constant delay, 2.0 = double each time).
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a retry config with the given number of total attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Patient settings for unreliable RF environments.
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Set the total number of attempts.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay cap.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Delay before the retry following the given 1-based attempt.
    fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Up to 25% jitter spreads reconnect storms apart.
            capped * (1.0 + rand::rng().random::<f64>() * 0.25)
        } else {
            capped
        };

        Duration::from_secs_f64(final_delay)
    }
}

/// Execute an async operation with retry on transient errors.
///
/// Retries only errors for which [`Error::is_retryable`] holds. The final
/// attempt's error propagates unwrapped.
///
/// # Errors
///
/// Whatever the operation last returned.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation_name: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "{} succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= max_attempts || !e.is_retryable() {
                    return Err(e);
                }

                let delay = config.delay_after_attempt(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    operation_name, attempt, max_attempts, delay, e
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
