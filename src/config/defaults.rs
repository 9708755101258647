//! Default configuration values

use std::time::Duration;

/// Timeout for GitHub API calls
pub const API_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect timeout for file downloads
pub const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for a single file download
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Download configuration file name
pub const DOWNLOADS_TOML: &str = "downloads.toml";

/// Lock file name
pub const DOWNLOADS_LOCK: &str = "downloads.lock";

/// Content cache directory name
pub const DOWNLOADS_CACHE: &str = "downloads_cache";

/// GitHub token file name
pub const GITHUB_TOKEN: &str = "github.token";

/// Output directory holding the SD card layout
pub const SD_ROOT: &str = "sd";

/// Static files copied over the SD root after downloading
pub const CONFIG_FILES: &str = "config_files";

/// Pattern a personal access token must match to be used
pub const GITHUB_TOKEN_PATTERN: &str = r"^ghp_[A-Za-z0-9]{36}$";

/// User agent sent with every request (the GitHub API rejects requests without one)
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
