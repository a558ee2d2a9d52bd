//! The reduction engine: merge-summarize and top-K selection.
//!
//! Both procedures share one execution model. A round turns the current
//! working collection into a set of prompts, dispatches every prompt as an
//! independent task tagged with its bucket/pair index, waits on the join
//! barrier, and reassembles replies by tag. Arrival order never matters, so
//! output is deterministic given deterministic oracle responses.
//!
//! - [`merge`] — collapse a document's chunk sequence to a single summary.
//! - [`select`] — narrow a candidate list down to the top K entries.
//! - [`split`] — boundary-aware, no-overlap document splitting.
//! - [`parse`] — extraction of chosen indices from free-text oracle replies.

pub mod merge;
pub mod parse;
pub mod select;
pub mod split;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{OracleError, ReduceError};
use crate::oracle::Oracle;
use crate::retry::{RetryConfig, call_with_retry};

pub use merge::MergeConfig;
pub use select::{Candidate, SelectConfig, SelectOutcome};
pub use split::split_text;

/// Configuration for a [`Reducer`]. Passed explicitly to the constructor —
/// there is no process-wide state.
#[derive(Debug, Clone)]
pub struct ReduceConfig {
    /// Merge-summarize settings.
    pub merge: MergeConfig,
    /// Top-K selection settings.
    pub select: SelectConfig,
    /// Retry behavior for every oracle call.
    pub retry: RetryConfig,
    /// Maximum oracle calls in flight at once, across a round.
    pub max_in_flight: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            select: SelectConfig::default(),
            retry: RetryConfig::default(),
            max_in_flight: 8,
        }
    }
}

/// The reduction engine. Holds the shared oracle and configuration; all
/// working collections are created fresh per invocation and discarded once
/// the terminal value is returned.
pub struct Reducer {
    pub(crate) oracle: Arc<dyn Oracle>,
    pub(crate) config: ReduceConfig,
    limiter: Arc<Semaphore>,
}

impl Reducer {
    /// Create a reducer over the given oracle.
    pub fn new(oracle: Arc<dyn Oracle>, config: ReduceConfig) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        Self {
            oracle,
            config,
            limiter,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Run one round: dispatch every prompt as an index-tagged task, block on
    /// the join barrier, reassemble replies by tag.
    ///
    /// Every task runs to completion (success or exhausted retries) before
    /// the round resolves; afterwards the lowest-index failure, if any,
    /// propagates. In-flight calls are bounded by the engine's semaphore.
    pub(crate) async fn run_round(&self, prompts: Vec<String>) -> Result<Vec<String>, ReduceError> {
        let total = prompts.len();
        let mut js: JoinSet<(usize, Result<String, ReduceError>)> = JoinSet::new();

        for (idx, prompt) in prompts.into_iter().enumerate() {
            let oracle = Arc::clone(&self.oracle);
            let retry = self.config.retry.clone();
            let limiter = Arc::clone(&self.limiter);
            js.spawn(async move {
                let permit = limiter.acquire_owned().await;
                let result = match permit {
                    Ok(_permit) => call_with_retry(&oracle, &prompt, &retry).await,
                    Err(e) => Err(ReduceError::Oracle(OracleError::Other(format!(
                        "round limiter closed: {e}"
                    )))),
                };
                (idx, result)
            });
        }

        // Join barrier: collect every task into its slot.
        let mut slots: Vec<Option<Result<String, ReduceError>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = js.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => {
                    return Err(ReduceError::Oracle(OracleError::Other(format!(
                        "round task panicked: {e}"
                    ))));
                }
            }
        }

        let mut replies = Vec::with_capacity(total);
        for (idx, slot) in slots.into_iter().enumerate() {
            let result = slot.ok_or_else(|| {
                ReduceError::Oracle(OracleError::Other(format!("round task {idx} vanished")))
            })?;
            replies.push(result?);
        }
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::test_support::EchoOracle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn round_reassembles_by_index_not_arrival() {
        // Oracle whose latency is inversely proportional to the prompt
        // number, so later-dispatched tasks finish first.
        struct StaggeredOracle;
        impl Oracle for StaggeredOracle {
            fn complete(&self, prompt: &str) -> crate::oracle::OracleFuture<'_> {
                let n: u64 = prompt.parse().unwrap();
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(40 - 10 * n)).await;
                    Ok(format!("reply-{n}"))
                })
            }
        }

        let reducer = Reducer::new(Arc::new(StaggeredOracle), ReduceConfig::default());
        let prompts = vec!["0".into(), "1".into(), "2".into(), "3".into()];
        let replies = reducer.run_round(prompts).await.unwrap();
        assert_eq!(replies, vec!["reply-0", "reply-1", "reply-2", "reply-3"]);
    }

    #[tokio::test]
    async fn round_bounds_in_flight_calls() {
        struct CountingOracle {
            active: AtomicUsize,
            peak: AtomicUsize,
        }
        impl Oracle for CountingOracle {
            fn complete(&self, _prompt: &str) -> crate::oracle::OracleFuture<'_> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    self.active.fetch_sub(1, Ordering::SeqCst);
                    Ok("ok".into())
                })
            }
        }

        let oracle = Arc::new(CountingOracle {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let config = ReduceConfig {
            max_in_flight: 2,
            ..Default::default()
        };
        let reducer = Reducer::new(oracle.clone(), config);
        let prompts: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        reducer.run_round(prompts).await.unwrap();
        assert!(oracle.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn round_propagates_lowest_index_failure_after_barrier() {
        struct FailSecondOracle;
        impl Oracle for FailSecondOracle {
            fn complete(&self, prompt: &str) -> crate::oracle::OracleFuture<'_> {
                let fail = prompt == "1";
                Box::pin(async move {
                    if fail {
                        Err(OracleError::Other("boom".into()))
                    } else {
                        Ok("fine".into())
                    }
                })
            }
        }

        let reducer = Reducer::new(Arc::new(FailSecondOracle), ReduceConfig::default());
        let prompts = vec!["0".into(), "1".into(), "2".into()];
        let err = reducer.run_round(prompts).await.unwrap_err();
        assert!(matches!(
            err,
            ReduceError::Oracle(OracleError::Other(ref msg)) if msg == "boom"
        ));
    }

    #[tokio::test]
    async fn empty_round_is_noop() {
        let reducer = Reducer::new(Arc::new(EchoOracle::new()), ReduceConfig::default());
        let replies = reducer.run_round(Vec::new()).await.unwrap();
        assert!(replies.is_empty());
    }
}
