//! Build command implementation
//!
//! Implements `sdpack build`: download every configured item, lay it out
//! under `sd/`, then apply the console-specific touch-ups.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::status;
use crate::core::cache::ContentCache;
use crate::core::engine::{Engine, RunSummary};
use crate::core::lock::LockStore;
use crate::core::manifest::Manifest;
use crate::core::placement::Placer;
use crate::core::token::load_github_token;
use crate::github::GithubClient;
use crate::infra::dirs::SdpackDirs;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;

/// Leftover launcher that must not ship on Mariko units
const REBOOT_TO_PAYLOAD: &str = "switch/reboot_to_payload.nro";

/// Build options
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build for a Mariko (patched) console
    #[arg(long)]
    pub mariko: bool,

    /// Do not copy config_files/ over the SD tree
    #[arg(long)]
    pub no_config: bool,

    /// Delete sd/ and downloads.lock before building
    #[arg(long)]
    pub rebuild: bool,

    /// Pack the SD tree into NAME.zip
    #[arg(long, value_name = "NAME")]
    pub pack: Option<String>,
}

/// Execute the build command
pub async fn execute(dirs: &SdpackDirs, args: &BuildArgs, quiet: bool) -> Result<()> {
    if args.rebuild {
        rebuild_cleanup(dirs)?;
    }

    let manifest = Manifest::load(&dirs.config_path())
        .with_context(|| format!("Failed to load {}", dirs.config_path().display()))?;
    tracing::info!(
        "Loaded {} section(s), {} item(s)",
        manifest.sections.len(),
        manifest.item_count()
    );

    let lock_path = dirs.lock_path();
    let mut lock = LockStore::load(&lock_path).with_context(|| "Failed to load lock file")?;

    let token = load_github_token(&dirs.token_path());
    let github = GithubClient::new(token);
    if !github.is_authenticated() {
        tracing::info!("No GitHub token, using anonymous API access");
    }

    let temp_dir = tempfile::TempDir::new().context("Failed to create temporary directory")?;
    let mut engine = Engine::new(
        github,
        DownloadManager::new().with_progress(!quiet),
        ContentCache::new(dirs.cache_dir()),
        temp_dir.path(),
    );
    let placer = Placer::new(dirs.sd_root(), temp_dir.path());

    let result = engine
        .download_all(&manifest.sections, &mut lock, &placer)
        .await;

    // Persist what was learned before any failure propagates
    let saved = lock.save(&lock_path);
    match (result, saved) {
        (Err(e), Err(save_err)) => {
            tracing::error!("{save_err}");
            return Err(e.into());
        }
        (Err(e), Ok(())) => return Err(e.into()),
        (Ok(()), saved) => saved.with_context(|| "Failed to save lock file")?,
    }

    post_process(dirs, args, &placer)?;
    print_summary(engine.summary());
    Ok(())
}

/// Remove the previous SD tree and lock file
fn rebuild_cleanup(dirs: &SdpackDirs) -> Result<()> {
    let sd_root = dirs.sd_root();
    if sd_root.exists() {
        filesystem::remove_dir_all(&sd_root)?;
        tracing::info!("Removed `{}`", sd_root.display());
    }

    let lock_path = dirs.lock_path();
    if lock_path.exists() {
        filesystem::remove_file(&lock_path)?;
        tracing::info!("Removed `{}`", lock_path.display());
    }
    Ok(())
}

fn post_process(dirs: &SdpackDirs, args: &BuildArgs, placer: &Placer) -> Result<()> {
    if args.mariko {
        if placer.create_payload()?.is_none() {
            tracing::warn!("No hekate payload found in `{}`", placer.sd_root().display());
        }
        placer.remove_from_root(&[REBOOT_TO_PAYLOAD.to_string()])?;
    } else {
        tracing::info!("Erista specific functionality not implemented");
    }

    let moved = placer.move_nro_apps_into_folders()?;
    tracing::debug!("Moved {moved} nro app(s) into their own folder");

    if !args.no_config {
        placer.copy_config_files(&dirs.config_files_dir())?;
    }

    if let Some(name) = &args.pack {
        let archive_path = dirs.base_dir().join(format!("{name}.zip"));
        let count = placer
            .pack(&archive_path)
            .with_context(|| format!("Failed to pack {}", archive_path.display()))?;
        println!(
            "{} Packed {count} file(s) into {}",
            status::SUCCESS,
            archive_path.display()
        );
    }
    Ok(())
}

fn print_summary(summary: RunSummary) {
    println!();
    println!("{} Build complete! ({} item(s))", status::SUCCESS, summary.total());
    println!("  Downloaded: {}", summary.downloaded);
    println!("  Up to date: {}", summary.up_to_date);
    if summary.failed > 0 {
        println!("  {} Failed: {}", status::WARNING, summary.failed);
    }
}
