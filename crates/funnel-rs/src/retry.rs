//! Retry with exponential backoff for transient oracle failures.
//!
//! Retries rate-limit and timeout errors only, capped at a fixed number of
//! attempts (default 4 total). Every attempt is bounded by a wall-clock
//! timeout; exceeding it counts as a retryable failure. All other errors
//! propagate immediately with their original cause. Exhausting the attempt
//! budget converts the last transient error into
//! [`ReduceError::OracleUnavailable`].

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::{OracleError, ReduceError};
use crate::oracle::Oracle;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (1 = no retries, just fail immediately).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier (typically 2.0 for exponential backoff).
    pub multiplier: f64,
    /// Whether to add jitter to prevent thundering herd.
    pub jitter: bool,
    /// Wall-clock budget for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
            attempt_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Create a config with the given total attempt count. Uses sensible
    /// defaults for everything else.
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts.max(1),
            ..Default::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            // Deterministic jitter keyed on the attempt number — enough to
            // spread concurrent retries without pulling in rand.
            let jitter_factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                3 => 0.85,
                _ => 0.80,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Issue one oracle call with per-attempt timeout and bounded retry.
///
/// The retry predicate is [`OracleError::is_retryable`]: rate limits and
/// timeouts are re-issued after a backoff sleep, everything else returns
/// immediately as [`ReduceError::Oracle`]. When the attempt budget runs out
/// the last transient error is wrapped in
/// [`ReduceError::OracleUnavailable`].
pub async fn call_with_retry(
    oracle: &Arc<dyn Oracle>,
    prompt: &str,
    config: &RetryConfig,
) -> Result<String, ReduceError> {
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(config.attempt_timeout, oracle.complete(prompt))
            .await
        {
            Ok(inner) => inner,
            Err(_) => Err(OracleError::Timeout(format!(
                "attempt exceeded {}s budget",
                config.attempt_timeout.as_secs()
            ))),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if !e.is_retryable() => return Err(ReduceError::Oracle(e)),
            Err(e) => {
                attempt += 1;
                if attempt >= config.max_attempts {
                    return Err(ReduceError::OracleUnavailable {
                        attempts: attempt,
                        last: e,
                    });
                }
                let delay = config.delay_for_attempt(attempt - 1);
                warn!(
                    "Transient oracle error (attempt {attempt}/{}): {e}. Retrying in {delay:?}...",
                    config.max_attempts,
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
