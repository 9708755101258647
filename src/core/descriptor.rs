//! Asset descriptors
//!
//! A descriptor says *how* to obtain one file: a release asset of a GitHub
//! repository, a file on a repository's default branch, or a plain URL.
//! All validation happens in [`AssetDescriptor::create`]; a descriptor that
//! exists is always well formed.

use std::fmt;

use regex::Regex;
use reqwest::Url;

use crate::error::ConfigError;

/// How a release asset is picked from the asset list
#[derive(Debug, Clone)]
pub enum AssetSelector {
    /// Exact asset name
    Name(String),
    /// First asset whose name contains a match
    Regex(Regex),
}

impl AssetSelector {
    /// Whether `asset_name` is selected
    pub fn matches(&self, asset_name: &str) -> bool {
        match self {
            Self::Name(name) => name == asset_name,
            Self::Regex(regex) => regex.is_match(asset_name),
        }
    }
}

impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Declarative description of one file to obtain
#[derive(Debug, Clone)]
pub enum AssetDescriptor {
    /// An asset attached to the latest release of `repo`
    GithubReleaseAsset { repo: String, selector: AssetSelector },
    /// A file on the default branch of `repo`
    GithubRepoFile { repo: String, file_path: String },
    /// Any URL
    RawUrl { url: Url },
}

/// Raw, unvalidated descriptor fields as they appear in a config table
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorFields<'a> {
    pub repo: Option<&'a str>,
    pub asset_name: Option<&'a str>,
    pub asset_regex: Option<&'a str>,
    pub file: Option<&'a str>,
    pub url: Option<&'a str>,
}

impl AssetDescriptor {
    /// Validate `fields` and build the matching descriptor
    ///
    /// `table` names the config table the fields came from and is carried
    /// by every error. Empty strings count as absent.
    pub fn create(fields: DescriptorFields<'_>, table: &str) -> Result<Self, ConfigError> {
        let repo = non_empty(fields.repo);
        let url = non_empty(fields.url);
        let asset_name = non_empty(fields.asset_name);
        let asset_regex = non_empty(fields.asset_regex);
        let file = non_empty(fields.file);
        let table = table.to_string();

        match (repo, url) {
            (Some(repo), None) => {
                let selectors = [asset_name, asset_regex, file]
                    .iter()
                    .filter(|s| s.is_some())
                    .count();
                if selectors != 1 {
                    return Err(ConfigError::MissingSelector { table });
                }

                if let Some(name) = asset_name {
                    Ok(Self::GithubReleaseAsset {
                        repo: repo.to_string(),
                        selector: AssetSelector::Name(name.to_string()),
                    })
                } else if let Some(pattern) = asset_regex {
                    let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
                        table,
                        pattern: pattern.to_string(),
                        error: e.to_string(),
                    })?;
                    Ok(Self::GithubReleaseAsset {
                        repo: repo.to_string(),
                        selector: AssetSelector::Regex(regex),
                    })
                } else {
                    Ok(Self::GithubRepoFile {
                        repo: repo.to_string(),
                        file_path: file.unwrap_or_default().to_string(),
                    })
                }
            }
            (None, Some(url)) => {
                if asset_name.is_some() || asset_regex.is_some() || file.is_some() {
                    return Err(ConfigError::UrlNotAlone { table });
                }
                let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
                    table,
                    url: url.to_string(),
                    error: e.to_string(),
                })?;
                Ok(Self::RawUrl { url: parsed })
            }
            _ => Err(ConfigError::MissingSource { table }),
        }
    }

    /// Repository, if this descriptor points at GitHub
    pub fn repo(&self) -> Option<&str> {
        match self {
            Self::GithubReleaseAsset { repo, .. } | Self::GithubRepoFile { repo, .. } => {
                Some(repo)
            }
            Self::RawUrl { .. } => None,
        }
    }
}

impl fmt::Display for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GithubReleaseAsset { repo, selector } => write!(f, "{repo} [{selector}]"),
            Self::GithubRepoFile { repo, file_path } => write!(f, "{repo}:{file_path}"),
            Self::RawUrl { url } => write!(f, "{url}"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
