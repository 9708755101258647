//! sdpack CLI - SD card builder for modded consoles
//!
//! Entry point for the sdpack command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sdpack::cli::output::{display_error, log_directive};
use sdpack::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the flag-derived level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose, cli.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        display_error(&e);
        std::process::exit(1);
    }
}
