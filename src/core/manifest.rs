//! Download configuration (downloads.toml) parsing and validation
//!
//! Each top-level key names a section and holds an array of tables:
//!
//! ```toml
//! [[bootloader]]
//! repo = "CTCaer/hekate"
//! asset_regex = "hekate_ctcaer_.*\\.zip"
//!
//! [[payloads]]
//! url = "https://example.com/lockpick.bin"
//! remove = ["bootloader/payloads/old.bin"]
//! ```
//!
//! Section order and item order follow the file.

use std::path::Path;

use serde::Deserialize;

use crate::config::defaults;
use crate::core::descriptor::{AssetDescriptor, DescriptorFields};
use crate::core::section::{Section, SectionId, SectionItem};
use crate::error::ConfigError;

/// One table of a section array, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawItem {
    repo: Option<String>,
    asset_name: Option<String>,
    asset_regex: Option<String>,
    file: Option<String>,
    url: Option<String>,
    #[serde(default)]
    remove: Vec<String>,
}

/// The parsed download configuration
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Sections in file order
    pub sections: Vec<Section>,
}

impl Manifest {
    /// Load and validate the configuration at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new(defaults::DOWNLOADS_TOML))
    }

    /// Total number of items across sections
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let parse_err = |error: String| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        };

        let table: toml::Table = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;

        let mut sections = Vec::with_capacity(table.len());
        for (name, value) in table {
            let id: SectionId = name.parse()?;
            let raw_items: Vec<RawItem> = value
                .try_into()
                .map_err(|e: toml::de::Error| parse_err(format!("section `{name}`: {e}")))?;

            let items = raw_items
                .into_iter()
                .map(|raw| {
                    let fields = DescriptorFields {
                        repo: raw.repo.as_deref(),
                        asset_name: raw.asset_name.as_deref(),
                        asset_regex: raw.asset_regex.as_deref(),
                        file: raw.file.as_deref(),
                        url: raw.url.as_deref(),
                    };
                    Ok(SectionItem {
                        descriptor: AssetDescriptor::create(fields, &name)?,
                        remove: raw.remove,
                    })
                })
                .collect::<Result<Vec<_>, ConfigError>>()?;

            tracing::debug!("Section `{name}`: {} item(s)", items.len());
            sections.push(Section { id, name, items });
        }

        Ok(Self { sections })
    }
}
