//! Digest-bot configuration with sensible defaults.
//!
//! [`NewsConfig`] captures the settings a scheduled digest run needs and
//! converts them into `funnel-rs` types via
//! [`build_reduce_config`](NewsConfig::build_reduce_config). SMTP settings
//! come from the environment so credentials stay out of the command line.

use funnel_rs::prelude::*;

use crate::mail::MailConfig;

/// Configuration for one digest run.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// RSS feed to pull. Default: TechCrunch.
    pub feed_url: String,
    /// Model for selection and summarization calls. Default: `"gpt-4"`.
    pub model: String,
    /// API base URL (OpenAI-compatible).
    pub base_url: String,
    /// How many stories to keep. Default: `3`.
    pub top: usize,
    /// Freshness window in hours. Default: `24`.
    pub freshness_hours: i64,
    /// Maximum chunk size for article summarization. Default: `2500`.
    pub chunk_size: usize,
    /// Maximum oracle calls in flight at once. Default: `8`.
    pub max_in_flight: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://techcrunch.com/feed/".to_string(),
            model: funnel_rs::DEFAULT_MODEL.to_string(),
            base_url: funnel_rs::DEFAULT_BASE_URL.to_string(),
            top: 3,
            freshness_hours: 24,
            chunk_size: 2500,
            max_in_flight: 8,
        }
    }
}

impl NewsConfig {
    /// Build a [`ReduceConfig`] from this digest config.
    pub fn build_reduce_config(&self) -> ReduceConfig {
        ReduceConfig {
            merge: MergeConfig {
                chunk_size: self.chunk_size,
                ..Default::default()
            },
            select: SelectConfig {
                target: self.top,
                ..Default::default()
            },
            max_in_flight: self.max_in_flight,
            ..Default::default()
        }
    }

    /// Read SMTP delivery settings from the environment.
    ///
    /// Required: `SMTP_SERVER`, `EMAIL_SENDER`, `EMAIL_PASSWORD`,
    /// `EMAIL_RECIPIENT`. Optional: `SMTP_PORT` (default 587).
    pub fn mail_config_from_env() -> Result<MailConfig, String> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| format!("{name} environment variable is not set"))
        };
        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| format!("invalid SMTP_PORT '{v}': {e}"))?,
            Err(_) => 587,
        };
        Ok(MailConfig {
            smtp_server: var("SMTP_SERVER")?,
            smtp_port,
            sender: var("EMAIL_SENDER")?,
            password: var("EMAIL_PASSWORD")?,
            recipient: var("EMAIL_RECIPIENT")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_daily_digest_shape() {
        let config = NewsConfig::default();
        assert_eq!(config.top, 3);
        assert_eq!(config.freshness_hours, 24);
        assert_eq!(config.chunk_size, 2500);
        assert!(config.feed_url.contains("techcrunch"));
    }

    #[test]
    fn reduce_config_carries_digest_settings() {
        let config = NewsConfig {
            top: 5,
            chunk_size: 1000,
            max_in_flight: 2,
            ..Default::default()
        };
        let reduce = config.build_reduce_config();
        assert_eq!(reduce.select.target, 5);
        assert_eq!(reduce.merge.chunk_size, 1000);
        assert_eq!(reduce.max_in_flight, 2);
    }
}
