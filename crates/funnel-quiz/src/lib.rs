//! Query-augmented retrieval generation: parse an educational request,
//! retrieve matching context from a vector index, generate questions.
//!
//! The pipeline in order: [`query`] turns a natural-language request into a
//! structured [`ParsedQuery`](query::ParsedQuery) and a retrieval query;
//! [`chunk`] cleans and windows source documents; [`store`] embeds chunks
//! and serves cosine-similarity search; [`generate`] builds the
//! question-generation prompt and formats the model's reply.

pub mod chunk;
pub mod generate;
pub mod query;
pub mod store;

pub use chunk::{ChunkConfig, TextChunk, clean_text, split_into_chunks};
pub use generate::{format_questions, generate_questions, validate_questions};
pub use query::{ParsedQuery, QueryParser};
pub use store::{DocChunk, Embedder, MetadataFilter, ScoredChunk, VectorIndex};
