//! Core logic
//!
//! # Submodules
//!
//! - [`descriptor`] - Asset descriptors and their validation
//! - [`section`] - Destination sections of the SD card
//! - [`manifest`] - Download configuration (downloads.toml) parsing
//! - [`lock`] - Lock file handling
//! - [`cache`] - Lock-gated content cache for release assets
//! - [`token`] - GitHub token loading
//! - [`engine`] - Download dispatch
//! - [`placement`] - Placing artifacts onto the SD tree

pub mod cache;
pub mod descriptor;
pub mod engine;
pub mod lock;
pub mod manifest;
pub mod placement;
pub mod section;
pub mod token;
