//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::infra::dirs::{SdpackDirs, ENV_BASE_DIR};
use commands::Commands;

/// sdpack - SD card builder for modded consoles
///
/// Downloads the latest homebrew releases listed in downloads.toml and lays
/// them out as an SD card tree.
#[derive(Parser, Debug)]
#[command(name = "sdpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Working directory holding downloads.toml
    #[arg(long, global = true, env = ENV_BASE_DIR, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    ///
    /// Without a subcommand a default build is run.
    pub async fn run(self) -> Result<()> {
        let base_dir = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let dirs = SdpackDirs::new(base_dir);

        self.command
            .unwrap_or_default()
            .run(&dirs, self.quiet)
            .await
    }
}
