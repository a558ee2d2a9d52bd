//! Minimal merge-summarize example.
//!
//! ```sh
//! OPENAI_API_KEY=... cargo run -p funnel-rs --example summarize -- notes.txt
//! ```

use std::sync::Arc;

use funnel_rs::prelude::*;

#[tokio::main]
async fn main() -> Result<(), String> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY is not set".to_string())?;
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| "usage: summarize <file>".to_string())?;
    let document = std::fs::read_to_string(&path).map_err(|e| format!("failed to read {path}: {e}"))?;

    let client = ChatClient::new(api_key).map_err(|e| e.to_string())?;
    let reducer = Reducer::new(Arc::new(client), ReduceConfig::default());

    let summary = reducer
        .merge_summarize(&document)
        .await
        .map_err(|e| e.to_string())?;
    println!("{summary}");
    Ok(())
}
