//! Download handling for upstream sprite archives
//!
//! Direct HTTP downloads with retry, plus instructions for archives that
//! only exist behind a file-hosting folder page and must be fetched by hand.

mod http;

pub use http::{download_file, HttpClient};

use anyhow::{anyhow, Context, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Default retry configuration
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Wrapper that adds retry logic to any async download function
pub async fn with_retry<F, Fut, T>(operation_name: &str, max_retries: u32, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=max_retries {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("{} succeeded on attempt {}/{}", operation_name, attempt, max_retries);
                }
                return Ok(result);
            }
            Err(e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name, attempt, max_retries, e
                );
                last_error = Some(e);

                if attempt < max_retries {
                    info!("Retrying in {} seconds...", RETRY_DELAY.as_secs());
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("no attempts were made")))
        .with_context(|| format!("{} failed after {} attempts", operation_name, max_retries))
}

/// How an archive reaches the scratch directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadSource {
    /// Direct link, fetched over HTTP
    Http { url: &'static str },
    /// Folder page on a file host; the user saves the file by hand
    Manual { url: &'static str },
}

impl DownloadSource {
    pub fn url(&self) -> &'static str {
        match self {
            DownloadSource::Http { url } | DownloadSource::Manual { url } => url,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            DownloadSource::Http { url } => format!("HTTP: {}", http::truncate_url(url)),
            DownloadSource::Manual { url } => format!("Manual: {}", http::truncate_url(url)),
        }
    }

    /// Check if this requires manual user action
    pub fn requires_manual(&self) -> bool {
        matches!(self, DownloadSource::Manual { .. })
    }
}
