//! Retrieval-augmented question generation over a local vector index.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Ingest a document into the index
//! funnel-quiz ingest textbook.txt --topic "AI in Education" --bloom-level Understand
//!
//! # Generate questions from a natural-language request
//! funnel-quiz ask "Generate two Evaluate-level questions about AI in Education"
//!
//! # Inspect the index
//! funnel-quiz status
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use funnel_quiz::{
    ChunkConfig, DocChunk, MetadataFilter, QueryParser, VectorIndex, clean_text,
    generate_questions, split_into_chunks, validate_questions,
};
use funnel_rs::ChatClient;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Retrieval-augmented question generation over a local vector index.
#[derive(Parser)]
#[command(name = "funnel-quiz")]
struct Cli {
    /// Path of the JSON index file.
    #[arg(long, default_value = "funnel-quiz-index.json")]
    index: PathBuf,

    /// Model for question generation.
    #[arg(long, default_value = funnel_rs::DEFAULT_MODEL)]
    model: String,

    /// API base URL (OpenAI-compatible).
    #[arg(long, default_value = funnel_rs::DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed, and store a plain-text document.
    Ingest {
        /// Path to the document.
        file: PathBuf,

        /// Topic metadata attached to every chunk.
        #[arg(long, default_value = "")]
        topic: String,

        /// Bloom's-taxonomy level metadata attached to every chunk.
        #[arg(long, default_value = "")]
        bloom_level: String,

        /// Words per chunk.
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,

        /// Overlapping words between adjacent chunks.
        #[arg(long, default_value_t = 200)]
        overlap: usize,
    },

    /// Parse a request, retrieve context, and generate questions.
    Ask {
        /// The natural-language request.
        query: String,

        /// How many chunks to retrieve as context.
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Restrict retrieval to chunks tagged with this Bloom level.
        #[arg(long)]
        bloom_level: Option<String>,
    },

    /// Report index size and configuration status.
    Status,
}

fn client_from(cli: &Cli) -> Result<ChatClient, String> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY environment variable is not set".to_string())?;
    ChatClient::with_endpoint(api_key, &cli.base_url, &cli.model)
        .map_err(|e| format!("failed to create API client: {e}"))
}

fn load_or_new_index(path: &PathBuf) -> Result<VectorIndex, String> {
    if path.exists() {
        VectorIndex::load(path)
    } else {
        Ok(VectorIndex::new())
    }
}

async fn ingest(
    cli: &Cli,
    file: &PathBuf,
    topic: &str,
    bloom_level: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<(), String> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let cleaned = clean_text(&raw);
    let chunks = split_into_chunks(
        &cleaned,
        &ChunkConfig {
            chunk_size,
            overlap,
        },
    );
    if chunks.is_empty() {
        return Err(format!("no text chunks extracted from {}", file.display()));
    }

    let source = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let docs: Vec<DocChunk> = chunks
        .into_iter()
        .map(|c| DocChunk {
            id: format!("doc_{}", c.chunk_id),
            text: c.text,
            chunk_id: c.chunk_id,
            source: source.clone(),
            topic: topic.to_string(),
            bloom_level: bloom_level.to_string(),
        })
        .collect();

    let client = client_from(cli)?;
    let mut index = load_or_new_index(&cli.index)?;
    let stored = index.upsert(&client, docs).await?;
    index.save(&cli.index)?;
    println!(
        "Stored {stored} chunks from {} ({} total in {})",
        file.display(),
        index.len(),
        cli.index.display()
    );
    Ok(())
}

async fn ask(
    cli: &Cli,
    query: &str,
    top_k: usize,
    bloom_level: Option<&str>,
) -> Result<(), String> {
    let parser = QueryParser::new();
    let parsed = parser.parse(query);
    if parsed.confidence < 0.3 {
        warn!(
            "Query parsing confidence is low ({:.2}); results may be off-topic",
            parsed.confidence
        );
    }
    let retrieval = parser.retrieval_query(&parsed);

    let index = load_or_new_index(&cli.index)?;
    if index.is_empty() {
        return Err(format!(
            "index {} is empty; ingest a document first",
            cli.index.display()
        ));
    }

    let client = client_from(cli)?;
    let filter = bloom_level.map(|level| MetadataFilter::BloomLevel(level.to_string()));
    let hits = index
        .search(&client, &retrieval, top_k, filter.as_ref())
        .await?;
    if hits.is_empty() {
        return Err("no search results found".to_string());
    }

    let context = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let questions = generate_questions(&client, &context, &parsed).await?;
    for issue in validate_questions(&questions) {
        warn!("{issue}");
    }

    for (i, question) in questions.iter().enumerate() {
        println!("{}. {question}", i + 1);
    }
    Ok(())
}

fn status(cli: &Cli) -> Result<(), String> {
    let index = load_or_new_index(&cli.index)?;
    let key_configured = std::env::var("OPENAI_API_KEY").is_ok();
    println!("index file:      {}", cli.index.display());
    println!("stored chunks:   {}", index.len());
    println!("api configured:  {key_configured}");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Ingest {
            file,
            topic,
            bloom_level,
            chunk_size,
            overlap,
        } => ingest(&cli, file, topic, bloom_level, *chunk_size, *overlap).await,
        Command::Ask {
            query,
            top_k,
            bloom_level,
        } => ask(&cli, query, *top_k, bloom_level.as_deref()).await,
        Command::Status => status(&cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
