//! GitHub API response types
//!
//! Only the fields sdpack reads are modelled; everything else in the
//! response is ignored.

use serde::Deserialize;

use crate::core::descriptor::AssetSelector;

/// `GET /repos/{repo}/releases/latest`
#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One entry of a release's `assets`
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    pub updated_at: String,
}

/// `GET /repos/{repo}`
#[derive(Deserialize, Debug, Clone)]
pub struct Repository {
    pub default_branch: Option<String>,
}

impl Release {
    /// First asset, in API order, picked by `selector`
    pub fn find_asset(&self, selector: &AssetSelector) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| selector.matches(&asset.name))
    }
}
