//! Pairwise merge-summarize: collapse a document to a single summary.
//!
//! The document is split into chunks, then reduced over `ceil(log2(n))`
//! rounds. Each round pairs adjacent chunks `(0,1), (2,3), …` and replaces
//! every pair with the oracle's summary of the pair's concatenation. An odd
//! chunk count leaves the last chunk unpaired; it is carried forward
//! untouched as the final element of the next round's sequence, so no
//! content is ever dropped and a round maps `n` chunks to `ceil(n/2)`.
//!
//! All pair calls within a round run concurrently and the round completes
//! only once every call resolves; replies are reassembled by pair index.

use tracing::{debug, info};

use crate::error::{OracleError, ReduceError};
use crate::reduce::Reducer;
use crate::reduce::split::split_text;
use crate::retry::call_with_retry;

/// Default maximum chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 2500;

/// Default summarization instruction prepended to each pair's text.
pub const SUMMARIZE_PROMPT: &str = "Concisely and simply explain what this text is about: ";

/// Configuration for pairwise merge-summarize.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Maximum chunk size for the initial split.
    pub chunk_size: usize,
    /// Instruction prepended to each pair's concatenated text.
    pub prompt: String,
    /// Whether a single-chunk document still gets one oracle pass.
    ///
    /// When false (the default) a document that fits in one chunk is
    /// returned raw — the round count for one chunk is zero, so the oracle
    /// is never consulted. When true the engine performs exactly one
    /// summarization pass instead.
    pub summarize_single_chunk: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            prompt: SUMMARIZE_PROMPT.to_string(),
            summarize_single_chunk: false,
        }
    }
}

/// Number of reduction rounds for a chunk count: `ceil(log2(n))`, zero for
/// a single chunk.
pub(crate) fn rounds_for(chunk_count: usize) -> u32 {
    match chunk_count {
        0 | 1 => 0,
        n if n.is_power_of_two() => n.ilog2(),
        n => n.ilog2() + 1,
    }
}

impl Reducer {
    /// Collapse a document into a single summary string.
    ///
    /// A zero-length document flows through unchanged as one empty chunk —
    /// under `summarize_single_chunk` the oracle is invoked on it like any
    /// other chunk, with no special-casing.
    pub async fn merge_summarize(&self, document: &str) -> Result<String, ReduceError> {
        let prompt = self.config.merge.prompt.clone();
        let mut working = split_text(document, self.config.merge.chunk_size);
        let rounds = rounds_for(working.len());
        info!(
            "Merge-summarize: {} chunks, {} rounds",
            working.len(),
            rounds
        );

        if rounds == 0 {
            let only = working.swap_remove(0);
            if self.config.merge.summarize_single_chunk {
                let text = format!("{prompt}{only}");
                return call_with_retry(&self.oracle, &text, &self.config.retry).await;
            }
            return Ok(only);
        }

        for round in 1..=rounds {
            let before = working.len();
            let leftover = if working.len() % 2 == 1 {
                working.pop()
            } else {
                None
            };

            let prompts: Vec<String> = working
                .chunks(2)
                .map(|pair| format!("{prompt}{}{}", pair[0], pair[1]))
                .collect();

            let mut next = self.run_round(prompts).await?;
            if let Some(rest) = leftover {
                next.push(rest);
            }

            debug!(
                "Merge round {round}/{rounds}: {before} -> {} chunks",
                next.len()
            );
            working = next;
        }

        working.into_iter().next().ok_or_else(|| {
            ReduceError::Oracle(OracleError::Other(
                "merge rounds left no chunk behind".into(),
            ))
        })
    }
}
