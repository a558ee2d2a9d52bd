//! Error taxonomy for oracle calls and reduction operations.
//!
//! Two layers, matching where each failure is absorbed:
//!
//! - [`OracleError`] — a single oracle call failed. `RateLimited` and
//!   `Timeout` are transient and eligible for retry; `Other` carries every
//!   remaining failure (auth, malformed request, server error) and is never
//!   retried.
//! - [`ReduceError`] — a whole reduction operation failed. Produced when a
//!   call exhausts its retries (`OracleUnavailable`), when a selection round
//!   chooses nothing from any bucket (`EmptySelection`), or when a
//!   non-retryable oracle error escapes (`Oracle`).
//!
//! A reply with no parseable indices is *not* an error — the bucket simply
//! contributes nothing to the round's union. A selection that cannot be
//! backfilled to the target count is a recorded shortfall, not a failure.

use thiserror::Error;

/// Failure of a single oracle call.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// The service rejected the call for exceeding its rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The call exceeded its wall-clock budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Any other failure. Never retried; the original cause is preserved.
    #[error("{0}")]
    Other(String),
}

impl OracleError {
    /// Whether the retry combinator may re-issue the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::RateLimited(_) | OracleError::Timeout(_))
    }
}

/// Failure of a top-level reduction operation.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// A retryable error persisted through every allowed attempt.
    #[error("oracle unavailable after {attempts} attempts: {last}")]
    OracleUnavailable { attempts: u32, last: OracleError },

    /// A selection round's buckets collectively chose zero items. Progress
    /// is unbounded from an empty working set, so this is terminal.
    #[error("selection round {round} chose no items from any bucket")]
    EmptySelection { round: u32 },

    /// A non-retryable oracle error, propagated with its original cause.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_and_timeout_are_retryable() {
        assert!(OracleError::RateLimited("429".into()).is_retryable());
        assert!(OracleError::Timeout("attempt exceeded 120s".into()).is_retryable());
    }

    #[test]
    fn other_is_not_retryable() {
        assert!(!OracleError::Other("HTTP 401: unauthorized".into()).is_retryable());
    }

    #[test]
    fn unavailable_reports_attempts_and_cause() {
        let err = ReduceError::OracleUnavailable {
            attempts: 4,
            last: OracleError::Timeout("attempt exceeded 120s".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("4 attempts"));
        assert!(msg.contains("timed out"));
    }
}
