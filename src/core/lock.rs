//! Lock file handling
//!
//! The lock file (downloads.lock) records, for every release-asset
//! descriptor, which release produced the asset currently in the cache.
//! It is read once at start, mutated in memory, and written once at the end
//! of a run (or right before a fatal error propagates).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::descriptor::AssetSelector;
use crate::error::LockError;

/// Identity of a fetched release asset
///
/// Equality is structural over all four fields; a re-published asset with
/// the same tag but a new `asset_updated_at` is a different record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LockRecord {
    /// `owner/name` of the repository
    pub repo: String,
    /// Release tag the asset came from
    pub tag_name: String,
    /// Asset file name
    pub asset_name: String,
    /// `updated_at` timestamp GitHub reports for the asset
    pub asset_updated_at: String,
}

impl LockRecord {
    /// Whether this record belongs to the descriptor `(repo, selector)`
    pub fn belongs_to(&self, repo: &str, selector: &AssetSelector) -> bool {
        self.repo == repo && selector.matches(&self.asset_name)
    }
}

/// On-disk shape of the lock file
#[derive(Debug, Default, Serialize, Deserialize)]
struct LockFile {
    #[serde(default)]
    package: Vec<LockRecord>,
}

/// Ordered set of lock records keyed by repo + selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockStore {
    records: Vec<LockRecord>,
}

impl LockStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records` in order
    pub fn from_records(records: Vec<LockRecord>) -> Self {
        Self { records }
    }

    /// Load the store from `path`; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, LockError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No lock file at `{}`", path.display());
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(LockError::Read {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };

        Self::from_toml(&content).map_err(|e| LockError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Write the store to `path`
    pub fn save(&self, path: &Path) -> Result<(), LockError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| LockError::Write {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        tracing::debug!(
            "Saved {} lock record(s) to `{}`",
            self.records.len(),
            path.display()
        );
        Ok(())
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: LockFile = toml::from_str(content)?;
        Ok(Self {
            records: file.package,
        })
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, LockError> {
        let file = LockFile {
            package: self.records.clone(),
        };
        toml::to_string(&file).map_err(|e| LockError::Serialize(e.to_string()))
    }

    /// Record for the descriptor `(repo, selector)`, if any
    ///
    /// When several records share `repo`, the selector decides.
    pub fn find(&self, repo: &str, selector: &AssetSelector) -> Option<&LockRecord> {
        self.records.iter().find(|r| r.belongs_to(repo, selector))
    }

    /// Drop the record for `(repo, selector)`; returns it if there was one
    pub fn remove(&mut self, repo: &str, selector: &AssetSelector) -> Option<LockRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.belongs_to(repo, selector))?;
        Some(self.records.remove(index))
    }

    /// Make `record` the record for `(record.repo, selector)`
    ///
    /// An identical record already present leaves the store untouched.
    /// Otherwise the previous record is removed before the new one is
    /// appended.
    pub fn upsert(&mut self, selector: &AssetSelector, record: LockRecord) {
        if self.find(&record.repo, selector) == Some(&record) {
            return;
        }
        self.remove(&record.repo, selector);
        self.records.push(record);
    }

    /// All records in order
    pub fn all(&self) -> &[LockRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
