//! One-shot fetch.

use anyhow::{Context, Result};
use ticker_core::fetch::HttpFetcher;

pub async fn run(url: &str) -> Result<()> {
    let batch = HttpFetcher::new()
        .fetch_batch(url)
        .await
        .with_context(|| format!("fetch tickers from {url}"))?;
    tracing::info!(url, count = batch.tickers.len(), "fetched ticker batch");
    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}
