//! HTTP download functionality
//!
//! Fetches a single URL into a target directory. A non-200 response is a
//! soft failure (reported, `Ok(None)`); a transport failure is a hard
//! [`DownloadError`] that aborts the run.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use percent_encoding::percent_decode_str;
use reqwest::header::CACHE_CONTROL;
use reqwest::{StatusCode, Url};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Download manager for fetching files one at a time
#[derive(Debug, Clone)]
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
    /// Draw a progress bar on stderr while streaming
    show_progress: bool,
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(defaults::USER_AGENT)
                .timeout(defaults::DOWNLOAD_TIMEOUT)
                .connect_timeout(defaults::DOWNLOAD_CONNECT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `url` into `target_dir`
    ///
    /// The file name is taken from the URL path, never from the server.
    /// `target_dir` is created if needed.
    ///
    /// # Returns
    /// `Ok(Some(path))` on success, `Ok(None)` when the server answered with
    /// anything but 200 or no file name can be derived.
    pub async fn fetch(
        &self,
        url: &str,
        target_dir: &Path,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let Some(filename) = file_name_from_url(url) else {
            println!("Unable to determine a file name for `{url}`");
            return Ok(None);
        };

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| DownloadError::Transport {
                filename: filename.clone(),
                error: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            println!(
                "Failed to download `{filename}`. Status code: {}",
                response.status().as_u16()
            );
            return Ok(None);
        }

        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|e| DownloadError::IoError {
                path: target_dir.to_path_buf(),
                error: e.to_string(),
            })?;

        let dest = target_dir.join(&filename);
        let bar = self.progress_bar(response.content_length());

        let result = write_body(response, &dest, &filename, &bar).await;
        bar.finish_and_clear();

        if let Err(e) = result {
            // Never leave a truncated file behind
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(e);
        }

        tracing::info!("File downloaded to `{}`", dest.display());
        Ok(Some(dest))
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let Some(total) = total else {
            return ProgressBar::hidden();
        };

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("\t[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("█▓▒░"));
        }
        pb
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream a response body into `dest`
async fn write_body(
    response: reqwest::Response,
    dest: &Path,
    filename: &str,
    bar: &ProgressBar,
) -> Result<(), DownloadError> {
    let mut file = File::create(dest)
        .await
        .map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::Transport {
            filename: filename.to_string(),
            error: e.to_string(),
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        bar.inc(chunk.len() as u64);
    }

    file.flush().await.map_err(|e| DownloadError::IoError {
        path: dest.to_path_buf(),
        error: e.to_string(),
    })
}

/// Derive a local file name from the last path segment of `url`
///
/// Query and fragment are ignored and percent-escapes decoded. Anything that
/// would escape the target directory is reduced to its final component.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();

    Path::new(decoded.as_ref())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
