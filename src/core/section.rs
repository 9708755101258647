//! Sections
//!
//! A section groups the items of one destination on the SD card. Items are
//! processed in declaration order because a later item's `remove` list may
//! delete files placed by an earlier one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::descriptor::AssetDescriptor;
use crate::error::ConfigError;

/// Known destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Bootloader,
    Firmware,
    Payload,
    NroApp,
    AtmosphereModule,
    Overlay,
    TegraexplorerScript,
}

impl SectionId {
    /// Every section, in canonical order
    pub const ALL: [Self; 7] = [
        Self::Bootloader,
        Self::Firmware,
        Self::Payload,
        Self::NroApp,
        Self::AtmosphereModule,
        Self::Overlay,
        Self::TegraexplorerScript,
    ];

    /// Canonical config name
    pub fn name(self) -> &'static str {
        match self {
            Self::Bootloader => "bootloader",
            Self::Firmware => "firmware",
            Self::Payload => "payload",
            Self::NroApp => "nro_app",
            Self::AtmosphereModule => "atmosphere_module",
            Self::Overlay => "overlay",
            Self::TegraexplorerScript => "tegraexplorer_script",
        }
    }

    /// Destination relative to the SD root
    pub fn relative_dir(self) -> &'static str {
        match self {
            Self::Bootloader | Self::Firmware => "",
            Self::Payload => "bootloader/payloads",
            Self::NroApp => "switch",
            Self::AtmosphereModule => "atmosphere/contents",
            Self::Overlay => "switch/.overlays",
            Self::TegraexplorerScript => "tegraexplorer/scripts",
        }
    }

    /// Destination under `sd_root`
    pub fn save_path(self, sd_root: &Path) -> PathBuf {
        match self.relative_dir() {
            "" => sd_root.to_path_buf(),
            dir => sd_root.join(dir),
        }
    }
}

impl FromStr for SectionId {
    type Err = ConfigError;

    /// Accepts the canonical name and its plural form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let singular = s.strip_suffix('s').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s || id.name() == singular)
            .ok_or_else(|| ConfigError::UnknownSection {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a section
#[derive(Debug, Clone)]
pub struct SectionItem {
    /// How to obtain the file
    pub descriptor: AssetDescriptor,
    /// Paths relative to the SD root deleted after placement
    pub remove: Vec<String>,
}

/// A named destination group
#[derive(Debug, Clone)]
pub struct Section {
    /// Destination
    pub id: SectionId,
    /// Name as written in the config file
    pub name: String,
    /// Items in declaration order
    pub items: Vec<SectionItem>,
}
