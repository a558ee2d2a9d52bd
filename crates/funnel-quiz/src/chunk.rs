//! Text cleaning and overlapping word-window chunking.
//!
//! Source documents are normalized (whitespace collapsed, control noise
//! stripped) and split into word windows of `chunk_size` words that overlap
//! by `overlap` words, so passages near a window boundary appear whole in at
//! least one chunk. This is the retrieval-side splitter — unlike the
//! reduction engine's boundary-aware splitter it trades exact content
//! reconstruction for recall.

use std::sync::OnceLock;

use regex::Regex;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,!?;:\-()]").expect("noise pattern"))
}

/// Clean and normalize raw document text.
pub fn clean_text(text: &str) -> String {
    let collapsed = whitespace_re().replace_all(text, " ");
    noise_re().replace_all(&collapsed, "").trim().to_string()
}

/// Word-window chunking parameters.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between adjacent chunks. Must be smaller than
    /// `chunk_size` — the stride would otherwise be zero.
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// One word-window chunk with its position in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub chunk_id: usize,
    pub start_word: usize,
    pub end_word: usize,
}

/// Split cleaned text into overlapping word windows.
pub fn split_into_chunks(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    assert!(
        config.overlap < config.chunk_size,
        "overlap ({}) must be less than chunk_size ({})",
        config.overlap,
        config.chunk_size
    );

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let stride = config.chunk_size - config.overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        let chunk_text = words[start..end].join(" ");
        if !chunk_text.is_empty() {
            chunks.push(TextChunk {
                text: chunk_text,
                chunk_id: chunks.len(),
                start_word: start,
                end_word: end,
            });
        }
        if end == words.len() {
            break;
        }
        start += stride;
    }

    chunks
}
