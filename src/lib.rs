//! sdpack - SD card builder for modded consoles
//!
//! Reads a list of homebrew sources from `downloads.toml`, fetches the latest
//! release of each one, and lays the files out as an SD card tree.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Descriptors, lock store, content cache and dispatch
//! - [`github`] - GitHub REST API client
//! - [`infra`] - Infrastructure layer (network, filesystem, archives)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod github;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
