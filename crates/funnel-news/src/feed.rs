//! RSS feed fetching with a freshness window.
//!
//! Pulls the feed over HTTP, parses it, and keeps entries published within
//! the window (default: the last 24 hours). Entries without a timestamp or
//! without any usable text are skipped with a warning — a malformed entry
//! never sinks the whole run.

use chrono::{DateTime, Duration, Utc};
use feed_rs::parser;
use funnel_rs::reduce::Candidate;
use serde::Serialize;
use tracing::{info, warn};

/// One feed entry, carrying everything the digest pipeline needs.
#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub link: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub published: DateTime<Utc>,
}

impl Candidate for NewsItem {
    fn digest(&self) -> String {
        format!("{}: {}", self.title, self.summary)
    }
}

/// Fetch and parse the feed at `url`, keeping entries newer than `window`.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    window: Duration,
) -> Result<Vec<NewsItem>, String> {
    info!("Fetching news from {url}");
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("feed request failed: {e}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("feed request returned HTTP {status}"));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read feed body: {e}"))?;

    let feed = parser::parse(&bytes[..]).map_err(|e| format!("failed to parse feed: {e}"))?;
    let items = items_from_feed(feed, Utc::now() - window);
    info!("Found {} news articles", items.len());
    Ok(items)
}

/// Convert parsed feed entries into [`NewsItem`]s, dropping anything older
/// than `cutoff`.
pub fn items_from_feed(feed: feed_rs::model::Feed, cutoff: DateTime<Utc>) -> Vec<NewsItem> {
    let mut items = Vec::new();
    for entry in feed.entries {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default();

        let Some(published) = entry.published.or(entry.updated) else {
            warn!("Skipping '{title}': no publication date");
            continue;
        };
        if published < cutoff {
            continue;
        }

        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .unwrap_or_default();
        let content = entry
            .content
            .as_ref()
            .and_then(|c| c.body.clone())
            .unwrap_or_default();
        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        if summary.is_empty() && content.is_empty() {
            warn!("Skipping '{title}': entry has no text");
            continue;
        }

        items.push(NewsItem {
            link,
            title,
            summary,
            // Fall back to the summary when the feed carries no full body.
            content: if content.is_empty() {
                summary.clone()
            } else {
                content
            },
            published,
        });
    }
    items
}
