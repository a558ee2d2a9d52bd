//! Digest assembly: select the winners, summarize them, format the email.
//!
//! Selection runs first over the whole candidate list; each winner's full
//! content is then merge-summarized in selection order. Formatting mirrors
//! the classic digest layout — `Link / Title / Summary` blocks joined under
//! numbered separators with a dated subject line.

use chrono::{NaiveDate, Utc};
use funnel_rs::Reducer;
use serde::Serialize;
use tracing::info;

use crate::feed::NewsItem;

/// A fully formatted digest, ready to deliver.
#[derive(Debug, Serialize)]
pub struct Digest {
    pub subject: String,
    pub body: String,
    /// One formatted block per selected article.
    pub entries: Vec<String>,
}

/// Subject line for a given date.
pub fn subject_for(date: NaiveDate) -> String {
    format!("Tech News Summary - {}", date.format("%Y-%m-%d"))
}

/// Format one article block.
pub fn format_entry(item: &NewsItem, summary: &str) -> String {
    format!(
        "Link: {}\n\nTitle: {}\n\nSummary: {}",
        item.link, item.title, summary
    )
}

/// Assemble the email body from formatted article blocks.
pub fn format_body(entries: &[String]) -> String {
    let mut body = String::from("Here are today's top tech news summaries:\n\n");
    for (i, entry) in entries.iter().enumerate() {
        body.push_str(&format!("--- News {} ---\n{}\n\n", i + 1, entry));
    }
    body
}

/// Select the top stories and summarize each one.
pub async fn build_digest(reducer: &Reducer, items: Vec<NewsItem>) -> Result<Digest, String> {
    let outcome = reducer
        .select_top_k(items)
        .await
        .map_err(|e| format!("selection failed: {e}"))?;

    let mut entries = Vec::with_capacity(outcome.items.len());
    for item in &outcome.items {
        info!("Now summarizing: {}", item.title);
        let summary = reducer
            .merge_summarize(&item.content)
            .await
            .map_err(|e| format!("summarization of '{}' failed: {e}", item.title))?;
        info!("Summary complete: {}", item.title);
        entries.push(format_entry(item, &summary));
    }

    Ok(Digest {
        subject: subject_for(Utc::now().date_naive()),
        body: format_body(&entries),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            link: format!("https://example.com/{title}"),
            title: title.into(),
            summary: format!("{title} summary"),
            content: format!("{title} content"),
            published: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn subject_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(subject_for(date), "Tech News Summary - 2025-06-02");
    }

    #[test]
    fn entry_block_layout() {
        let block = format_entry(&item("launch"), "it launched");
        assert_eq!(
            block,
            "Link: https://example.com/launch\n\nTitle: launch\n\nSummary: it launched"
        );
    }

    #[test]
    fn body_numbers_entries_from_one() {
        let body = format_body(&["first block".into(), "second block".into()]);
        assert!(body.starts_with("Here are today's top tech news summaries:\n\n"));
        assert!(body.contains("--- News 1 ---\nfirst block\n\n"));
        assert!(body.contains("--- News 2 ---\nsecond block\n\n"));
    }

    #[test]
    fn empty_digest_body_is_just_the_header() {
        assert_eq!(
            format_body(&[]),
            "Here are today's top tech news summaries:\n\n"
        );
    }
}
