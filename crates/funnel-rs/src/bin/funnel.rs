//! Merge-summarize a document and print the result.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Summarize a file
//! funnel --file notes/report.txt
//!
//! # Pipe content from stdin
//! cat article.txt | funnel
//!
//! # Smaller chunks, custom model
//! funnel --file big.txt --chunk-size 1200 --model gpt-4o-mini
//! ```

use std::io::{self, Read};
use std::process;
use std::sync::Arc;

use clap::Parser;
use funnel_rs::prelude::*;
use tracing_subscriber::EnvFilter;

/// Merge-summarize a document and print the result.
///
/// Reads the API key from the OPENAI_API_KEY environment variable.
#[derive(Parser)]
#[command(name = "funnel")]
struct Cli {
    /// Path to the document. Without this, reads stdin.
    #[arg(long)]
    file: Option<String>,

    /// Model to use for summarization calls.
    #[arg(long, default_value = funnel_rs::DEFAULT_MODEL)]
    model: String,

    /// API base URL (OpenAI-compatible).
    #[arg(long, default_value = funnel_rs::DEFAULT_BASE_URL)]
    base_url: String,

    /// Maximum chunk size in bytes for the initial split.
    #[arg(long, default_value_t = funnel_rs::reduce::merge::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Summarize even when the document fits in a single chunk.
    #[arg(long)]
    summarize_single_chunk: bool,

    /// Maximum oracle calls in flight at once.
    #[arg(long, default_value_t = 8)]
    max_in_flight: usize,
}

fn read_document(cli: &Cli) -> Result<String, String> {
    match &cli.file {
        Some(path) => {
            std::fs::read_to_string(path).map_err(|e| format!("failed to read '{path}': {e}"))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(buf)
        }
    }
}

async fn run(cli: &Cli) -> Result<String, String> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY environment variable is not set".to_string())?;

    let document = read_document(cli)?;

    let client = ChatClient::with_endpoint(api_key, &cli.base_url, &cli.model)
        .map_err(|e| format!("failed to create API client: {e}"))?;

    let config = ReduceConfig {
        merge: MergeConfig {
            chunk_size: cli.chunk_size,
            summarize_single_chunk: cli.summarize_single_chunk,
            ..Default::default()
        },
        max_in_flight: cli.max_in_flight,
        ..Default::default()
    };

    let reducer = Reducer::new(Arc::new(client), config);
    reducer
        .merge_summarize(&document)
        .await
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
