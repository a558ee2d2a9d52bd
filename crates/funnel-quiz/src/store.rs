//! In-process vector index with cosine-similarity search.
//!
//! Chunks are embedded through the [`Embedder`] trait and stored alongside
//! their metadata. Search embeds the query, scores every entry by cosine
//! similarity, applies an optional metadata equality filter, and returns the
//! top-k scored chunks. The whole index serializes to a JSON file so a run
//! can pick up where ingestion left off.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use funnel_rs::error::OracleError;
use funnel_rs::{ChatClient, DEFAULT_EMBEDDING_MODEL};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Boxed future returned by [`Embedder::embed`].
pub type EmbedFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, OracleError>> + Send + 'a>>;

/// An embedding model treated as a black-box batch function.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving input order.
    fn embed(&self, texts: &[String]) -> EmbedFuture<'_>;
}

impl Embedder for ChatClient {
    fn embed(&self, texts: &[String]) -> EmbedFuture<'_> {
        let texts = texts.to_vec();
        Box::pin(async move { ChatClient::embed(self, &texts, DEFAULT_EMBEDDING_MODEL).await })
    }
}

/// A stored document chunk with retrieval metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    pub id: String,
    pub text: String,
    pub chunk_id: usize,
    pub source: String,
    pub topic: String,
    pub bloom_level: String,
}

/// A search hit.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocChunk,
    pub score: f32,
}

/// Metadata equality filter for search.
#[derive(Debug, Clone)]
pub enum MetadataFilter {
    Topic(String),
    BloomLevel(String),
}

impl MetadataFilter {
    fn matches(&self, chunk: &DocChunk) -> bool {
        match self {
            MetadataFilter::Topic(topic) => chunk.topic == *topic,
            MetadataFilter::BloomLevel(level) => chunk.bloom_level == *level,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    chunk: DocChunk,
    embedding: Vec<f32>,
}

/// The in-memory vector index.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed and store a batch of chunks. An entry with the same id as an
    /// incoming chunk is replaced. Returns the number stored.
    pub async fn upsert(
        &mut self,
        embedder: &dyn Embedder,
        chunks: Vec<DocChunk>,
    ) -> Result<usize, String> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder
            .embed(&texts)
            .await
            .map_err(|e| format!("embedding failed: {e}"))?;
        if embeddings.len() != chunks.len() {
            return Err(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            ));
        }

        let stored = chunks.len();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.entries.retain(|e| e.chunk.id != chunk.id);
            self.entries.push(IndexEntry { chunk, embedding });
        }
        info!("Stored {stored} chunks ({} total)", self.entries.len());
        Ok(stored)
    }

    /// Search for the `top_k` chunks most similar to `query`.
    pub async fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>, String> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder
            .embed(std::slice::from_ref(&query.to_string()))
            .await
            .map_err(|e| format!("query embedding failed: {e}"))?
            .into_iter()
            .next()
            .ok_or_else(|| "embedder returned no vector for the query".to_string())?;

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .filter(|e| filter.is_none_or(|f| f.matches(&e.chunk)))
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(&query_embedding, &e.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        debug!("Search returned {} hits", scored.len());
        Ok(scored)
    }

    /// Serialize the index to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string(self).map_err(|e| format!("failed to encode index: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
    }

    /// Load an index previously written by [`save`](VectorIndex::save).
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&json).map_err(|e| format!("failed to decode index: {e}"))
    }
}

/// Cosine similarity between two vectors; zero when either has no magnitude
/// or the dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
