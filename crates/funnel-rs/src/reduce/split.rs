//! Boundary-aware document splitting.
//!
//! Splits a document into an ordered sequence of chunks of at most
//! `max_size` bytes with no overlap. Boundaries are chosen from a fixed
//! preference ladder — paragraph break, then line break, then sentence end,
//! then word gap — falling back to a hard character cut only when a single
//! unbroken run exceeds the limit. Concatenating the chunks reproduces the
//! input exactly: separators stay attached to the piece they terminate and
//! nothing is trimmed.

/// Separator ladder, strongest boundary first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split `text` into chunks of at most `max_size` bytes.
///
/// An empty document yields exactly one empty chunk, so downstream code
/// never sees an empty sequence.
pub fn split_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }
    let pieces = split_at_level(text, max_size, 0);
    pack(pieces, max_size)
}

/// Recursively break `text` into pieces no larger than `max_size`, trying
/// separators in ladder order before resorting to a character cut.
fn split_at_level(text: &str, max_size: usize, level: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }
    if level >= SEPARATORS.len() {
        return hard_cut(text, max_size);
    }

    let sep = SEPARATORS[level];
    let parts: Vec<&str> = text.split_inclusive(sep).collect();
    if parts.len() <= 1 {
        return split_at_level(text, max_size, level + 1);
    }

    parts
        .into_iter()
        .flat_map(|part| split_at_level(part, max_size, level + 1))
        .collect()
}

/// Cut at character boundaries once no separator applies.
fn hard_cut(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > max_size {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Greedily merge adjacent pieces back together without crossing the size
/// limit, so chunks land as close to `max_size` as the boundaries allow.
fn pack(pieces: Vec<String>, max_size: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if !current.is_empty() && current.len() + piece.len() > max_size {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("hello world", 100), vec!["hello world"]);
    }

    #[test]
    fn empty_text_is_one_empty_chunk() {
        assert_eq!(split_text("", 100), vec![""]);
    }

    #[test]
    fn chunks_never_exceed_max_size() {
        let text = "word ".repeat(500);
        for chunk in split_text(&text, 64) {
            assert!(chunk.len() <= 64, "chunk of {} bytes", chunk.len());
        }
    }

    #[test]
    fn concatenation_reproduces_input() {
        let text = "First paragraph, with some text.\n\nSecond paragraph. It has two sentences.\nAnd a third line that runs a bit longer than the others do.";
        let chunks = split_text(text, 40);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = split_text(&text, 40);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].ends_with("\n\n"));
        assert!(chunks[1].starts_with('b'));
    }

    #[test]
    fn prefers_sentence_over_word_boundaries() {
        let text = "One sentence here. Another sentence follows it. And one more for size.";
        let chunks = split_text(text, 30);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.ends_with(". ") || chunk.ends_with(' '),
                "unexpected boundary in {chunk:?}"
            );
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn hard_cut_handles_unbroken_runs() {
        let text = "x".repeat(100);
        let chunks = split_text(&text, 32);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn hard_cut_respects_char_boundaries() {
        let text = "é".repeat(50); // 2 bytes each
        let chunks = split_text(&text, 33);
        assert_eq!(chunks.concat(), text);
        for chunk in chunks {
            assert!(chunk.len() <= 33);
        }
    }
}
