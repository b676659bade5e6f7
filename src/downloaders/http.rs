//! HTTP client with stall detection and progress tracking

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Stall detection: timeout if no progress for this duration.
const STALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Progress check interval
const PROGRESS_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Connection timeout: time to establish TCP connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read timeout: maximum time to wait for data between chunks
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Overall request timeout for a single HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Shared HTTP client
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sprite-dataset/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Shared progress state for stall detection
struct DownloadProgress {
    bytes_downloaded: AtomicU64,
    last_progress_time: Mutex<Instant>,
}

impl DownloadProgress {
    fn new() -> Self {
        Self {
            bytes_downloaded: AtomicU64::new(0),
            last_progress_time: Mutex::new(Instant::now()),
        }
    }

    fn add_bytes(&self, count: u64) {
        self.bytes_downloaded.fetch_add(count, Ordering::Relaxed);
        if let Ok(mut last) = self.last_progress_time.lock() {
            *last = Instant::now();
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::Relaxed)
    }

    fn time_since_progress(&self) -> Duration {
        self.last_progress_time
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }
}

/// Partial download path next to the final destination.
fn part_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output_path.with_file_name(name)
}

/// Download a file with stall detection and an optional progress bar.
///
/// The body is streamed into `<output>.part` and only renamed into place
/// once complete, so an interrupted download never looks like a cache hit.
pub async fn download_file(
    client: &HttpClient,
    url: &str,
    output_path: &Path,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let response = client
        .inner()
        .get(url)
        .send()
        .await
        .with_context(|| format!("Connection failed: {}", truncate_url(url)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("HTTP {} - {}", status.as_u16(), truncate_error(&body));
    }

    if let (Some(pb), Some(len)) = (progress_bar, response.content_length()) {
        pb.set_length(len);
    }

    let temp_path = part_path(output_path);
    let mut file = File::create(&temp_path)
        .await
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;

    let progress = Arc::new(DownloadProgress::new());
    let progress_clone = progress.clone();
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let stall_detector = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(PROGRESS_CHECK_INTERVAL) => {
                    let stall_time = progress_clone.time_since_progress();
                    if stall_time >= STALL_TIMEOUT {
                        warn!("Download stalled - no progress for {:?}", stall_time);
                        return Err(anyhow::anyhow!(
                            "Stalled: no data for {}s",
                            STALL_TIMEOUT.as_secs()
                        ));
                    }
                    debug!("Downloaded: {} bytes", progress_clone.total_bytes());
                }
                _ = shutdown_rx.changed() => {
                    return Ok(());
                }
            }
        }
    });

    let mut stream = response.bytes_stream();
    let download_result: Result<u64> = async {
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.context("Failed to read chunk")?;
            file.write_all(&chunk)
                .await
                .context("Failed to write chunk")?;
            let len = chunk.len() as u64;
            progress.add_bytes(len);

            if let Some(pb) = progress_bar {
                pb.inc(len);
            }
        }

        file.flush().await.context("Failed to flush file")?;
        Ok(progress.total_bytes())
    }
    .await;

    let _ = shutdown_tx.send(true);
    let total_bytes = match stall_detector.await {
        Ok(Ok(())) => download_result,
        Ok(Err(e)) => Err(e),
        Err(e) => {
            warn!("Stall detector task failed: {}", e);
            download_result
        }
    };

    let total_bytes = match total_bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&temp_path, output_path)
        .await
        .with_context(|| format!("Failed to move download into {}", output_path.display()))?;

    Ok(total_bytes)
}

/// Truncate URL for error messages
pub(crate) fn truncate_url(url: &str) -> String {
    truncate_chars(url, 80)
}

/// Truncate error body for display
fn truncate_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "No details".to_string()
    } else {
        truncate_chars(trimmed, 100)
    }
}

/// Cut `text` to at most `max` chars, ending in "..." when shortened
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
