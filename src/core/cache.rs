//! Download cache
//!
//! Release assets are stored content-addressed by release identity:
//! `cache_dir/<sha256("{asset_updated_at} {asset_name}")>/<asset_name>`.
//! Two releases shipping identically named assets never collide, and a
//! re-published asset lands in a fresh directory.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::core::lock::LockRecord;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Cache information
#[derive(Debug)]
pub struct CacheInfo {
    /// Cache directory path
    pub path: PathBuf,
    /// Total size in bytes
    pub size_bytes: u64,
    /// Number of cached files
    pub item_count: usize,
    /// Whether cache exists
    pub exists: bool,
}

impl CacheInfo {
    /// Format size for display
    pub fn format_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count for display
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size_bytes: u64) -> String {
    if size_bytes < 1024 {
        format!("{size_bytes} bytes")
    } else if size_bytes < 1024 * 1024 {
        format!("{:.1} KB", size_bytes as f64 / 1024.0)
    } else if size_bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", size_bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size_bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Content-addressed store for release assets
#[derive(Debug, Clone)]
pub struct ContentCache {
    cache_dir: PathBuf,
}

impl ContentCache {
    /// Create a cache rooted at `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache root
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding the asset identified by `record`
    pub fn asset_dir(&self, record: &LockRecord) -> PathBuf {
        self.cache_dir.join(cache_key(record))
    }

    /// Path of the cached asset identified by `record`
    pub fn asset_path(&self, record: &LockRecord) -> PathBuf {
        self.asset_dir(record).join(base_name(&record.asset_name))
    }

    /// Whether the asset for `record` is on disk
    pub fn contains(&self, record: &LockRecord) -> bool {
        self.asset_path(record).is_file()
    }

    /// Remove the cached directory of a superseded record
    ///
    /// A failure here does not stop the run: the replacement goes to a
    /// different directory anyway. Returns whether the directory is gone.
    pub fn evict(&self, record: &LockRecord) -> bool {
        let dir = self.asset_dir(record);
        match filesystem::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!("Removed `{}`", dir.display());
                true
            }
            Err(e) => {
                tracing::warn!("Could not evict stale cache entry: {e}");
                false
            }
        }
    }

    /// Size and item count of the cache
    pub fn info(&self) -> CacheInfo {
        let (size_bytes, item_count) = filesystem::dir_usage(&self.cache_dir);
        CacheInfo {
            path: self.cache_dir.clone(),
            size_bytes,
            item_count,
            exists: self.cache_dir.exists(),
        }
    }

    /// Delete the whole cache, returning the number of bytes freed
    pub fn clean(&self) -> Result<u64, FilesystemError> {
        if !self.cache_dir.exists() {
            return Ok(0);
        }
        let (size_before, _) = filesystem::dir_usage(&self.cache_dir);
        filesystem::remove_dir_all(&self.cache_dir)?;
        Ok(size_before)
    }
}

/// Hex SHA-256 of `"{asset_updated_at} {asset_name}"`
pub fn cache_key(record: &LockRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.asset_updated_at.as_bytes());
    hasher.update(b" ");
    hasher.update(base_name(&record.asset_name).as_bytes());
    hex::encode(hasher.finalize())
}

fn base_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}
