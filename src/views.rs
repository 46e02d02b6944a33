//! CLI views: the callers of the rate-limit pipeline. Each view issues one
//! domain request, renders its output, and on a rate-limited failure shows
//! the countdown notice until the episode ends.

use crate::api::ApiClient;
use crate::http::ApiError;
use crate::limit::{RateLimitInfo, RateLimitWatch};
use crate::notice::CountdownNotice;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub async fn run_upload(api: &ApiClient, watch: &RateLimitWatch, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        files.push((name, bytes));
    }
    match api.upload(files).await {
        Ok(resp) => {
            println!("{}", resp.message);
            for file in resp.files {
                println!("  {} ({} chunks)", file.name, file.chunks);
            }
            Ok(())
        }
        Err(err) => report_failure(watch, err, "Upload failed. Try again.").await,
    }
}

pub async fn run_search(api: &ApiClient, watch: &RateLimitWatch, query: &str) -> Result<()> {
    match api.search(query).await {
        Ok(results) => {
            if results.is_empty() {
                println!("No results found for \"{}\"", query);
                return Ok(());
            }
            println!("Results found: {}", results.len());
            for result in results {
                println!("[{}] {}", result.document_name, result.text);
            }
            Ok(())
        }
        Err(err) => report_failure(watch, err, "Search failed. Try again.").await,
    }
}

pub async fn run_ask(api: &ApiClient, watch: &RateLimitWatch, question: &str) -> Result<()> {
    match api.ask(question).await {
        Ok(resp) => {
            println!("{}", resp.answer);
            if !resp.citations.is_empty() {
                println!();
                println!("Sources:");
                for citation in resp.citations {
                    println!("  - {}", citation);
                }
            }
            Ok(())
        }
        Err(err) => report_failure(watch, err, "Could not get an answer. Try again.").await,
    }
}

pub async fn run_stats(api: &ApiClient, watch: &RateLimitWatch) -> Result<()> {
    match api.stats().await {
        Ok(stats) => {
            println!("Documents: {}", stats.documents);
            println!("Chunks: {}", stats.chunks);
            for name in stats.document_names {
                println!("  {}", name);
            }
            Ok(())
        }
        Err(err) => report_failure(watch, err, "Could not fetch stats. Try again.").await,
    }
}

/// Rate-limited failures render the countdown; everything else gets the
/// view's own error text. Either way the command exits non-zero.
async fn report_failure(watch: &RateLimitWatch, err: ApiError, fallback: &str) -> Result<()> {
    match err {
        ApiError::RateLimited(info) => {
            wait_out_limit(watch, &info).await;
            bail!("rate limited");
        }
        other => {
            eprintln!("{}", fallback);
            bail!(other);
        }
    }
}

/// Show the notice for the current episode and keep rendering the remaining
/// wait once per second until the notice closes itself or the watch
/// independently returns to baseline.
async fn wait_out_limit(watch: &RateLimitWatch, info: &RateLimitInfo) {
    eprintln!("{}", info.message);

    let closed = Arc::new(Notify::new());
    let notice = CountdownNotice::new({
        let closed = Arc::clone(&closed);
        move || closed.notify_one()
    });
    notice.show(info);

    if info.retry_after.is_none() {
        // No countdown to render; acknowledge and move on.
        notice.dismiss();
        return;
    }

    loop {
        tokio::select! {
            _ = closed.notified() => break,
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                if !watch.is_limited() {
                    // The watch expired first; hide without firing close.
                    notice.hide();
                    break;
                }
                if let Some(secs) = notice.remaining() {
                    eprintln!("You can retry in {}s", secs);
                }
            }
        }
    }
}
