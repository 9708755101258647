//! Working directory layout
//!
//! Every path sdpack reads or writes hangs off a single base directory
//! (the current directory unless `--dir` says otherwise). Nothing here is
//! global; the layout is built once and handed to whoever needs it.
//!
//! Environment variables can override defaults:
//! - `SDPACK_DIR` - Override the base directory (read by the CLI)
//! - `SDPACK_CACHE_DIR` - Override the download cache directory

use std::env;
use std::path::{Path, PathBuf};

use crate::config::defaults;

/// Environment variable names for directory overrides
pub const ENV_BASE_DIR: &str = "SDPACK_DIR";
pub const ENV_CACHE_DIR: &str = "SDPACK_CACHE_DIR";

/// Paths used during a run
#[derive(Debug, Clone)]
pub struct SdpackDirs {
    base_dir: PathBuf,
    cache_dir: PathBuf,
}

impl SdpackDirs {
    /// Create the layout rooted at `base_dir`
    ///
    /// Checks `SDPACK_CACHE_DIR` for the cache location, then falls back to
    /// `downloads_cache/` under the base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let cache_dir = env::var(ENV_CACHE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir.join(defaults::DOWNLOADS_CACHE));
        Self {
            base_dir,
            cache_dir,
        }
    }

    /// Use an explicit cache directory instead of the default
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Content cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `downloads.toml`
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(defaults::DOWNLOADS_TOML)
    }

    /// `downloads.lock`
    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(defaults::DOWNLOADS_LOCK)
    }

    /// `github.token`
    pub fn token_path(&self) -> PathBuf {
        self.base_dir.join(defaults::GITHUB_TOKEN)
    }

    /// Root of the SD card layout
    pub fn sd_root(&self) -> PathBuf {
        self.base_dir.join(defaults::SD_ROOT)
    }

    /// Static overlay copied onto the SD root
    pub fn config_files_dir(&self) -> PathBuf {
        self.base_dir.join(defaults::CONFIG_FILES)
    }
}
