//! The oracle abstraction — the LLM as a black-box text function.
//!
//! The reduction engine never talks HTTP. Everything it needs is the
//! [`Oracle`] trait: prompt in, completion text out, typed failure kinds.
//! [`ChatClient`](crate::ChatClient) implements it for real use; tests plug
//! in scripted doubles.

use std::future::Future;
use std::pin::Pin;

use crate::ChatClient;
use crate::error::OracleError;

/// Boxed future returned by [`Oracle::complete`].
///
/// Type alias to keep trait signatures and implementations readable.
pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>>;

/// A text-generation service treated as a black-box function from prompt to
/// completion text.
///
/// Implementations must be safe to invoke concurrently — every round of a
/// reduction dispatches many calls against the same shared oracle.
pub trait Oracle: Send + Sync {
    /// Complete the given prompt.
    fn complete(&self, prompt: &str) -> OracleFuture<'_>;
}

impl Oracle for ChatClient {
    fn complete(&self, prompt: &str) -> OracleFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move { ChatClient::complete(self, &prompt).await })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle that returns its prompt unchanged. Makes content-preservation
    /// invariants directly checkable.
    pub struct EchoOracle {
        pub calls: AtomicUsize,
    }

    impl EchoOracle {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Oracle for EchoOracle {
        fn complete(&self, prompt: &str) -> OracleFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = prompt.to_string();
            Box::pin(async move { Ok(reply) })
        }
    }

    /// Oracle that pops pre-scripted replies in call order. A scripted `Err`
    /// is returned once and not replayed.
    pub struct ScriptedOracle {
        replies: Mutex<Vec<Result<String, OracleError>>>,
    }

    impl ScriptedOracle {
        pub fn new(replies: Vec<Result<String, OracleError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }

        pub fn remaining(&self) -> usize {
            self.replies.lock().unwrap().len()
        }
    }

    impl Oracle for ScriptedOracle {
        fn complete(&self, _prompt: &str) -> OracleFuture<'_> {
            let next = {
                let mut replies = self.replies.lock().unwrap();
                if replies.is_empty() {
                    Err(OracleError::Other("script exhausted".into()))
                } else {
                    replies.remove(0)
                }
            };
            Box::pin(async move { next })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn echo_oracle_returns_prompt() {
        let oracle = EchoOracle::new();
        let out = oracle.complete("abc").await.unwrap();
        assert_eq!(out, "abc");
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn scripted_oracle_pops_in_order() {
        let oracle = ScriptedOracle::new(vec![
            Ok("first".into()),
            Err(OracleError::RateLimited("429".into())),
            Ok("second".into()),
        ]);
        assert_eq!(oracle.complete("x").await.unwrap(), "first");
        assert!(oracle.complete("x").await.is_err());
        assert_eq!(oracle.complete("x").await.unwrap(), "second");
        assert_eq!(oracle.remaining(), 0);
    }
}
