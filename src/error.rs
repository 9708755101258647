//! Error types for sdpack
//!
//! Domain-specific error types using thiserror.
//!
//! Soft failures (missing release, non-200 responses, unmatched assets) are
//! not errors: they are reported to the user and surface as `Ok(None)`.
//! Everything in here aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration (`downloads.toml`) errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither or both of `repo` / `url`
    #[error("Either `repo` or `url` must be provided in table array `{table}`")]
    MissingSource { table: String },

    /// Zero or several of `asset_name` / `asset_regex` / `file` with `repo`
    #[error("Either `asset_name`, `asset_regex` or `file` must be provided in table array `{table}`")]
    MissingSelector { table: String },

    /// `url` combined with a repository selector
    #[error("`url` must be provided alone in table array `{table}`")]
    UrlNotAlone { table: String },

    /// `asset_regex` does not compile
    #[error("Invalid asset_regex '{pattern}' in table array `{table}`: {error}")]
    InvalidRegex {
        table: String,
        pattern: String,
        error: String,
    },

    /// `url` does not parse
    #[error("Invalid url '{url}' in table array `{table}`: {error}")]
    InvalidUrl {
        table: String,
        url: String,
        error: String,
    },

    /// Section name not in the known set
    #[error("Unsupported section name: `{name}`")]
    UnknownSection { name: String },

    /// Config file not found
    #[error("Config file not found at '{path}'")]
    NotFound { path: PathBuf },

    /// TOML syntax or shape error
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

impl ConfigError {
    /// Name of the table the error is attributed to, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::MissingSource { table }
            | Self::MissingSelector { table }
            | Self::UrlNotAlone { table }
            | Self::InvalidRegex { table, .. }
            | Self::InvalidUrl { table, .. } => Some(table),
            Self::UnknownSection { .. } | Self::NotFound { .. } | Self::Parse { .. } => None,
        }
    }
}

/// Download errors
///
/// Only transport-level failures end up here; HTTP status failures are soft.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Connection, DNS, timeout or body stream failure while fetching a file
    #[error("Error while downloading `{filename}`: {error}")]
    Transport { filename: String, error: String },

    /// Connection failure while talking to the GitHub API
    #[error("Error while requesting '{url}': {error}")]
    Api { url: String, error: String },

    /// IO error writing the downloaded file
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Lock file errors
#[derive(Error, Debug)]
pub enum LockError {
    /// Failed to read the lock file
    #[error("Failed to read lock file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse the lock file
    #[error("Failed to parse lock file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Failed to serialize the lock file
    #[error("Failed to serialize lock file: {0}")]
    Serialize(String),

    /// Failed to write the lock file
    #[error("Failed to write lock file '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Errors while placing artifacts onto the SD tree
#[derive(Error, Debug)]
pub enum PlacementError {
    /// Archive could not be read or extracted
    #[error("Error while extracting the zip file '{path}': {error}")]
    Extract { path: PathBuf, error: String },

    /// Archive could not be written
    #[error("Error while packing '{path}': {error}")]
    Pack { path: PathBuf, error: String },

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },

    /// Failed to copy or move a file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to read a directory or file
    #[error("Failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },
}

/// Top-level sdpack error type
#[derive(Error, Debug)]
pub enum SdpackError {
    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Lock file error
    #[error("Lock file error: {0}")]
    Lock(#[from] LockError),

    /// Placement error
    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
