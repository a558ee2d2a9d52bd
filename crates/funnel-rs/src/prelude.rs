//! Convenience re-exports for common `funnel-rs` types.
//!
//! Meant to be glob-imported when building reduction pipelines:
//!
//! ```ignore
//! use funnel_rs::prelude::*;
//! ```

// ── Client & messages ───────────────────────────────────────────────
pub use crate::{ChatClient, ChatRequest, Message, MessageRole};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{OracleError, ReduceError};

// ── Oracle & retry ──────────────────────────────────────────────────
pub use crate::oracle::{Oracle, OracleFuture};
pub use crate::retry::RetryConfig;

// ── Reduction engine ────────────────────────────────────────────────
pub use crate::reduce::{
    Candidate, MergeConfig, ReduceConfig, Reducer, SelectConfig, SelectOutcome, split_text,
};
