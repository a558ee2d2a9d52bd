//! Daily tech-news digest bot built on the `funnel-rs` reduction engine.
//!
//! The pipeline: fetch an RSS feed and keep the last day's entries
//! ([`feed`]), narrow them to the top three via iterative selection and
//! summarize each winner via pairwise merge-summarize ([`digest`]), then
//! deliver the formatted digest over SMTP ([`mail`]).

pub mod config;
pub mod digest;
pub mod feed;
pub mod mail;

pub use config::NewsConfig;
pub use digest::{Digest, build_digest};
pub use feed::{NewsItem, fetch_feed};
pub use mail::{MailConfig, send_digest};
