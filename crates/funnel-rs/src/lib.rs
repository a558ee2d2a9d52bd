//! Recursive LLM reduction engine — merge-summarize and top-K selection.
//!
//! `funnel-rs` provides the core used by the digest bot and the
//! retrieval-generation pipeline: a pair of divide-and-conquer procedures
//! that collapse a large collection of text through repeated, parallel
//! oracle (LLM) calls.
//!
//! - [`reduce::merge`] — **pairwise merge-summarize**: split a document into
//!   chunks, then repeatedly pair adjacent chunks and replace each pair with
//!   the oracle's summary of their concatenation until one chunk remains.
//! - [`reduce::select`] — **iterative top-K selection**: partition candidate
//!   items into buckets, ask the oracle to rank each bucket, union the chosen
//!   positions, and repeat until at most K items remain (backfilling from the
//!   previous round when a round undershoots).
//! - [`retry`] — retry-with-backoff combinator for transient oracle failures
//!   (rate limits, timeouts), bounded at four attempts per call.
//!
//! # Getting started
//!
//! ```ignore
//! use funnel_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ReduceError> {
//!     let api_key = std::env::var("OPENAI_API_KEY").unwrap();
//!     let client = ChatClient::new(api_key)?;
//!
//!     let reducer = Reducer::new(Arc::new(client), ReduceConfig::default());
//!     let summary = reducer.merge_summarize("very long document…").await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! # Design principles
//!
//! 1. **The oracle is a black box.** Everything above the [`Oracle`] trait is
//!    pure in-process algorithm over in-memory collections; anything that can
//!    fail over the network lives below it.
//!
//! 2. **Rounds are barriers.** Each round dispatches its bucket/pair calls in
//!    parallel, tagged with their index, and blocks until every call resolves.
//!    Results are reassembled by tag, never by arrival order, so output is
//!    deterministic given deterministic oracle responses.
//!
//! 3. **Transient failures are absorbed low.** The retry combinator handles
//!    rate limits and timeouts; the algorithms handle structural gaps (empty
//!    buckets, unreachable K) with defined fallbacks; only exhausted retries
//!    and unexpected errors escape to the caller.
//!
//! 4. **No process-wide state.** Configuration travels in explicit structs
//!    ([`ReduceConfig`], [`retry::RetryConfig`]) passed to constructors.

pub mod error;
pub mod oracle;
pub mod prelude;
pub mod reduce;
pub mod retry;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

pub use error::{OracleError, ReduceError};
pub use oracle::{Oracle, OracleFuture};
pub use reduce::{ReduceConfig, Reducer};

// ── Constants ──────────────────────────────────────────────────────

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for all oracle calls.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Maximum tokens for a single completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// ── Request types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request body (OpenAI-compatible subset).
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct RawEmbeddingResponse {
    data: Option<Vec<RawEmbedding>>,
    error: Option<ApiErrorResponse>,
}

#[derive(Deserialize, Debug)]
struct RawEmbedding {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions API.
///
/// Shared read-only across concurrent reduction tasks — cloning is cheap
/// (the underlying `reqwest::Client` is an `Arc` internally) and no method
/// takes `&mut self`.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    /// Create a new client with the given API key and default endpoint/model.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OracleError> {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    /// Create a new client against a custom base URL and model.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .user_agent("funnel-rs/0.3")
            .build()
            .map_err(|e| OracleError::Other(format!("failed to build HTTP client: {e}")))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// The model used when a request doesn't name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request and return the assistant's text.
    pub async fn chat(&self, body: &ChatRequest) -> Result<String, OracleError> {
        let msg_count = body.messages.len();
        let model_label = body.model.as_deref().unwrap_or(&self.model);
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            model_label, msg_count, body.max_tokens, body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);

        // Fill in the default model when the request leaves it unset.
        let filled;
        let body = if body.model.is_some() {
            body
        } else {
            filled = ChatRequest {
                model: Some(self.model.clone()),
                ..body.clone()
            };
            &filled
        };

        let resp = self.post_json(&url, body).await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| OracleError::Other(format!("failed to read response: {e}")))?;

        let elapsed = start.elapsed();
        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            elapsed.as_secs_f64(),
            text.len()
        );

        if status.as_u16() == 429 {
            return Err(OracleError::RateLimited(format!("HTTP 429: {text}")));
        }
        if !status.is_success() {
            return Err(OracleError::Other(format!("API HTTP {status}: {text}")));
        }

        let parsed: RawChatResponse = serde_json::from_str(&text)
            .map_err(|e| OracleError::Other(format!("failed to parse response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(OracleError::Other(format!("API error: {}", err.message)));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::Other("empty completion".into()))
    }

    /// One-shot completion of a bare prompt with the client's default model.
    pub async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: None,
            messages: vec![Message::user(prompt)],
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
        };
        self.chat(&body).await
    }

    /// Generate embeddings for a batch of texts, in input order.
    pub async fn embed(
        &self,
        inputs: &[String],
        model: &str,
    ) -> Result<Vec<Vec<f32>>, OracleError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model,
            input: inputs,
        };
        debug!("Embedding request: model={}, inputs={}", model, inputs.len());

        let resp = self.post_json(&url, &body).await?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| OracleError::Other(format!("failed to read response: {e}")))?;

        if status.as_u16() == 429 {
            return Err(OracleError::RateLimited(format!("HTTP 429: {text}")));
        }
        if !status.is_success() {
            return Err(OracleError::Other(format!("API HTTP {status}: {text}")));
        }

        let parsed: RawEmbeddingResponse = serde_json::from_str(&text)
            .map_err(|e| OracleError::Other(format!("failed to parse response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(OracleError::Other(format!("API error: {}", err.message)));
        }

        let mut data = parsed
            .data
            .ok_or_else(|| OracleError::Other("empty embedding response".into()))?;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, OracleError> {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(format!("request failed: {e}"))
                } else {
                    OracleError::Other(format!("request failed: {e}"))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "hello");

        let user = Message::user("world");
        assert_eq!(user.role, MessageRole::User);
    }

    #[test]
    fn chat_request_skips_unset_fields() {
        let req = ChatRequest {
            model: None,
            messages: vec![Message::user("hi")],
            max_tokens: 0,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("model").is_none());
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ChatClient::with_endpoint("k", "https://example.com/v1/", "m").unwrap();
        assert_eq!(client.base_url, "https://example.com/v1");
    }
}
