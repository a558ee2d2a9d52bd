//! Iterative top-K selection: narrow a candidate list to its best K entries.
//!
//! Each round partitions the current list into buckets (sizes differ by at
//! most one), builds a positional digest per bucket, and asks the oracle to
//! pick and rank the most interesting entries by their 1-based positions.
//! The chosen positions are unioned across buckets — in ascending order, so
//! the next round preserves the original relative order — and the loop
//! repeats until at most K items remain. A round that undershoots K is
//! backfilled from the round before it; a round whose union is empty is a
//! terminal failure, since no further progress is possible.
//!
//! Item identity is positional: indices are fixed for the duration of a
//! round and the working list is never reordered mid-round.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::error::ReduceError;
use crate::reduce::Reducer;
use crate::reduce::parse::chosen_indices;

/// Default target count.
pub const DEFAULT_TARGET: usize = 3;

/// Default minimum bucket count per round.
pub const DEFAULT_MIN_BUCKETS: usize = 4;

/// An item that can describe itself in one digest line.
pub trait Candidate {
    /// One line for the bucket ranking prompt, e.g. `"title: summary"`.
    fn digest(&self) -> String;
}

impl Candidate for String {
    fn digest(&self) -> String {
        self.clone()
    }
}

/// Configuration for iterative top-K selection.
#[derive(Debug, Clone)]
pub struct SelectConfig {
    /// Number of items to keep (K).
    pub target: usize,
    /// Minimum number of buckets per round.
    pub min_buckets: usize,
    /// Ranking instruction appended after each bucket digest. When unset, a
    /// default is built from `target`.
    pub instruction: Option<String>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            min_buckets: DEFAULT_MIN_BUCKETS,
            instruction: None,
        }
    }
}

impl SelectConfig {
    fn instruction(&self) -> String {
        self.instruction.clone().unwrap_or_else(|| {
            format!(
                "Give me the top {}, in your opinion, most interesting entries. \
                 Rank your choices. Do not change the given indexes.",
                self.target
            )
        })
    }
}

/// Result of a selection run.
#[derive(Debug)]
pub struct SelectOutcome<T> {
    /// The selected items, at most K, in original relative order (plus any
    /// backfilled entries appended at the end).
    pub items: Vec<T>,
    /// Number of oracle rounds performed.
    pub rounds: u32,
    /// How far short of K the result fell after backfill. Zero in the
    /// normal case; non-zero only when the previous round could not cover
    /// the gap, which is reported as a diagnostic rather than an error.
    pub shortfall: usize,
}

/// Bucket sizes for one round: `total / buckets` with the remainder
/// distributed one each to the leading buckets, so sizes differ by at
/// most 1.
pub(crate) fn bucket_sizes(total: usize, buckets: usize) -> Vec<usize> {
    let base = total / buckets;
    let remainder = total % buckets;
    (0..buckets)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Build one positional digest per non-empty bucket. Positions are global
/// 1-based indices into the current round's list.
fn bucket_digests<T: Candidate>(items: &[T], min_buckets: usize) -> Vec<String> {
    let buckets = min_buckets.clamp(1, items.len());
    let sizes = bucket_sizes(items.len(), buckets);

    let mut digests = Vec::with_capacity(buckets);
    let mut pos = 0usize;
    for size in sizes {
        if size == 0 {
            continue;
        }
        let mut digest = String::new();
        for (offset, item) in items[pos..pos + size].iter().enumerate() {
            digest.push_str(&format!("{}. {}; ", pos + offset + 1, item.digest()));
        }
        digests.push(digest);
        pos += size;
    }
    digests
}

/// Pad an undershooting selection back toward `target` with the leading
/// items of the previous round, preserving order. Only applies when the
/// previous round had more than `target` items; otherwise the gap stays and
/// is returned as the shortfall.
pub(crate) fn backfill<T: Clone>(
    mut selected: Vec<T>,
    previous: &[T],
    target: usize,
) -> (Vec<T>, usize) {
    if selected.len() >= target {
        return (selected, 0);
    }
    let needed = target - selected.len();
    if previous.len() > target {
        selected.extend(previous.iter().take(needed).cloned());
        (selected, 0)
    } else {
        (selected, needed)
    }
}

impl Reducer {
    /// Narrow `items` down to the configured top K.
    ///
    /// A list already at or below K is returned unchanged with zero oracle
    /// calls, so re-running on a previous result is a no-op.
    pub async fn select_top_k<T>(&self, items: Vec<T>) -> Result<SelectOutcome<T>, ReduceError>
    where
        T: Candidate + Clone + Send,
    {
        let target = self.config.select.target;
        if items.len() <= target {
            return Ok(SelectOutcome {
                items,
                rounds: 0,
                shortfall: 0,
            });
        }

        let instruction = self.config.select.instruction();
        let mut current = items;
        let mut previous: Vec<T> = Vec::new();
        let mut round = 0u32;

        while current.len() > target {
            round += 1;
            previous.clone_from(&current);

            let prompts: Vec<String> =
                bucket_digests(&current, self.config.select.min_buckets)
                    .into_iter()
                    .map(|digest| format!("{digest}{instruction}"))
                    .collect();
            let replies = self.run_round(prompts).await?;

            let max_index = current.len();
            let mut chosen: BTreeSet<usize> = BTreeSet::new();
            for reply in &replies {
                chosen.extend(chosen_indices(reply, max_index));
            }

            if chosen.is_empty() {
                return Err(ReduceError::EmptySelection { round });
            }

            // Ascending position order keeps the survivors in their
            // original relative order for the next round.
            let next: Vec<T> = chosen.iter().map(|&pos| current[pos - 1].clone()).collect();
            current = next;
            info!(
                "Selection round {round}: {} -> {} items",
                previous.len(),
                current.len()
            );
        }

        let (final_items, shortfall) = backfill(current, &previous, target);
        if shortfall > 0 {
            warn!(
                "Insufficient candidates: {shortfall} short of the target {target} after backfill"
            );
        }

        Ok(SelectOutcome {
            items: final_items,
            rounds: round,
            shortfall,
        })
    }
}
