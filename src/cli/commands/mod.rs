//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod cache;
pub mod check;

use anyhow::Result;
use clap::Subcommand;

use crate::infra::dirs::SdpackDirs;

pub use build::BuildArgs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download everything in downloads.toml and assemble the SD tree
    Build(BuildArgs),

    /// Manage the download cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Validate downloads.toml without downloading anything
    Check,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Build(BuildArgs::default())
    }
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache information
    Info,

    /// Clear the cache and the lock file
    Clean,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, dirs: &SdpackDirs, quiet: bool) -> Result<()> {
        match self {
            Self::Build(args) => build::execute(dirs, &args, quiet).await,
            Self::Cache { command } => match command {
                CacheCommands::Info => cache::execute_info(dirs),
                CacheCommands::Clean => cache::execute_clean(dirs),
            },
            Self::Check => check::execute(dirs),
        }
    }
}
