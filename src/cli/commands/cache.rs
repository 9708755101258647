//! CLI command for `sdpack cache`
//!
//! Shows or purges the download cache.

use anyhow::{Context, Result};

use crate::cli::output::status;
use crate::core::cache::{format_size, ContentCache};
use crate::infra::dirs::SdpackDirs;
use crate::infra::filesystem;

/// Execute cache info subcommand
pub fn execute_info(dirs: &SdpackDirs) -> Result<()> {
    let info = ContentCache::new(dirs.cache_dir()).info();

    println!("Location: {}", info.path.display());
    println!("Size: {}", info.format_size());
    println!("Items: {}", info.item_count);

    if !info.exists {
        println!("\n{} Cache directory does not exist (empty cache)", status::INFO);
    }

    Ok(())
}

/// Execute cache clean subcommand
///
/// The lock file goes too: its records point into the cache.
pub fn execute_clean(dirs: &SdpackDirs) -> Result<()> {
    let freed = ContentCache::new(dirs.cache_dir())
        .clean()
        .context("Failed to clean cache")?;

    let lock_path = dirs.lock_path();
    if lock_path.exists() {
        filesystem::remove_file(&lock_path).context("Failed to remove lock file")?;
        tracing::info!("Removed `{}`", lock_path.display());
    }

    if freed > 0 {
        println!("{} Cache cleared ({} freed)", status::SUCCESS, format_size(freed));
    } else {
        println!("{} Cache was already empty", status::SUCCESS);
    }
    Ok(())
}
