//! GitHub token loading
//!
//! The token file holds a single classic personal access token. Anything
//! that does not look like one is ignored with a warning; a missing file
//! simply means unauthenticated calls.

use std::path::Path;

use regex::Regex;

use crate::config::defaults;

/// Read the token at `path`
pub fn load_github_token(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No GitHub token at `{}`: {e}", path.display());
            return None;
        }
    };
    parse_github_token(&content)
}

/// Validate token file content
pub fn parse_github_token(content: &str) -> Option<String> {
    let token = content.trim();
    let pattern = Regex::new(defaults::GITHUB_TOKEN_PATTERN).ok()?;

    if pattern.is_match(token) {
        return Some(token.to_string());
    }

    tracing::warn!("Invalid GitHub token `{}`", redact(token));
    None
}

/// Short prefix safe to show in logs
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}… ({} chars)", token.chars().count())
}
