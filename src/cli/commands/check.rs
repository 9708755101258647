//! Check command implementation
//!
//! Implements `sdpack check` to validate downloads.toml without downloading.

use anyhow::{Context, Result};

use crate::cli::output::status;
use crate::core::manifest::Manifest;
use crate::core::token::load_github_token;
use crate::infra::dirs::SdpackDirs;

/// Execute the check command
pub fn execute(dirs: &SdpackDirs) -> Result<()> {
    let config_path = dirs.config_path();
    let manifest = Manifest::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    println!("{} Configuration is valid", status::SUCCESS);

    for section in &manifest.sections {
        println!("\n{} ({} item(s)):", section.name, section.items.len());
        for item in &section.items {
            println!("  • {}", item.descriptor);
        }
    }

    if manifest.sections.is_empty() {
        println!("  (no sections)");
    }

    if load_github_token(&dirs.token_path()).is_none() {
        println!(
            "\n{} No valid GitHub token, API calls are rate limited",
            status::WARNING
        );
    }

    Ok(())
}
