//! Extraction of chosen indices from free-text oracle replies.
//!
//! The ranking prompt asks the oracle to rank its top picks by positional
//! index, which produces replies in a `rank. index` shape ("1. 7\n2. 3\n…").
//! Extraction is therefore two filters over the integers found in the reply:
//!
//! 1. Discard anything out of range for the current list — below 1 (positions
//!    are 1-based) or above `max_index`. Out-of-range integers are ignored,
//!    never an error.
//! 2. Of the survivors, keep every second one starting from the second
//!    (stride `[1::2]`), which drops the interleaved rank labels and keeps
//!    the chosen indices.
//!
//! A reply with no surviving integers selects nothing; the caller folds the
//! empty contribution into the round's union.

use std::sync::OnceLock;

use regex::Regex;

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+\b").expect("integer pattern"))
}

/// Extract the chosen 1-based indices from an oracle reply.
///
/// Applies the range filter first, then the every-second-element stride, in
/// that order — the stride operates on the in-range survivors.
pub fn chosen_indices(reply: &str, max_index: usize) -> Vec<usize> {
    let in_range: Vec<usize> = integer_re()
        .find_iter(reply)
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .filter(|&n| n >= 1 && n <= max_index)
        .collect();

    in_range.into_iter().skip(1).step_by(2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_reply_keeps_every_second_survivor() {
        // Matches [2, 5]; both in range; stride keeps position 1 only.
        assert_eq!(chosen_indices("I choose 2 and 5", 5), vec![5]);
    }

    #[test]
    fn ranked_list_reply_drops_rank_labels() {
        let reply = "My picks:\n1. 7\n2. 3\n3. 9";
        assert_eq!(chosen_indices(reply, 10), vec![7, 3, 9]);
    }

    #[test]
    fn out_of_range_discarded_before_stride() {
        // Raw matches [1, 12, 2, 3]; 12 is dropped first, so the stride
        // runs over [1, 2, 3] and keeps [2].
        assert_eq!(chosen_indices("1. 12\n2. 3", 10), vec![2]);
    }

    #[test]
    fn zero_is_out_of_range() {
        // Positions are 1-based; [0, 2, 4] filters to [2, 4], stride keeps [4].
        assert_eq!(chosen_indices("0 and 2 and 4", 5), vec![4]);
    }

    #[test]
    fn long_numeric_reply_follows_stride() {
        let reply = "1. 4\n2. 8\n3. 1\n4. 6\n5. 2";
        // All ten integers in range; stride keeps odd positions of the list.
        assert_eq!(chosen_indices(reply, 10), vec![4, 8, 1, 6, 2]);
    }

    #[test]
    fn no_integers_selects_nothing() {
        assert!(chosen_indices("none of these interest me", 5).is_empty());
        assert!(chosen_indices("", 5).is_empty());
    }

    #[test]
    fn all_out_of_range_selects_nothing() {
        assert!(chosen_indices("99 and 42", 5).is_empty());
    }

    #[test]
    fn single_survivor_selects_nothing() {
        // One in-range integer is treated as a rank label with no index.
        assert!(chosen_indices("3", 5).is_empty());
    }
}
