//! Fetch today's tech news, pick the top stories, and email a digest.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable; SMTP
//! credentials come from `SMTP_SERVER` / `SMTP_PORT` / `EMAIL_SENDER` /
//! `EMAIL_PASSWORD` / `EMAIL_RECIPIENT`.
//!
//! # Examples
//!
//! ```sh
//! # Print the digest instead of emailing it
//! funnel-news --dry-run
//!
//! # Different feed, more stories
//! funnel-news --feed-url https://example.com/feed.xml --top 5
//! ```

use std::process;
use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use funnel_news::{NewsConfig, build_digest, fetch_feed, send_digest};
use funnel_rs::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch today's tech news, pick the top stories, and email a digest.
#[derive(Parser)]
#[command(name = "funnel-news")]
struct Cli {
    /// RSS feed URL to pull.
    #[arg(long)]
    feed_url: Option<String>,

    /// Model to use for selection and summarization.
    #[arg(long)]
    model: Option<String>,

    /// API base URL (OpenAI-compatible).
    #[arg(long)]
    base_url: Option<String>,

    /// How many stories to keep.
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Freshness window in hours.
    #[arg(long, default_value_t = 24)]
    freshness_hours: i64,

    /// Print the digest to stdout instead of sending email.
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print the digest as JSON.
    #[arg(long)]
    json: bool,
}

async fn run(cli: &Cli) -> Result<(), String> {
    let mut config = NewsConfig {
        top: cli.top,
        freshness_hours: cli.freshness_hours,
        ..Default::default()
    };
    if let Some(url) = &cli.feed_url {
        config.feed_url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(base) = &cli.base_url {
        config.base_url = base.clone();
    }

    // Check delivery settings before spending any API calls.
    let mail = if cli.dry_run {
        None
    } else {
        Some(NewsConfig::mail_config_from_env()?)
    };

    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY environment variable is not set".to_string())?;
    let client = ChatClient::with_endpoint(api_key, &config.base_url, &config.model)
        .map_err(|e| format!("failed to create API client: {e}"))?;

    let http = reqwest::Client::new();
    let items = fetch_feed(&http, &config.feed_url, Duration::hours(config.freshness_hours)).await?;
    if items.is_empty() {
        info!("No fresh news in the window; nothing to send");
        return Ok(());
    }

    let reducer = Reducer::new(Arc::new(client), config.build_reduce_config());
    let digest = build_digest(&reducer, items).await?;

    match mail {
        Some(mail) => send_digest(&mail, &digest.subject, &digest.body).await,
        None if cli.json => {
            let json = serde_json::to_string_pretty(&digest)
                .map_err(|e| format!("failed to encode digest: {e}"))?;
            println!("{json}");
            Ok(())
        }
        None => {
            println!("Subject: {}\n\n{}", digest.subject, digest.body);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
