//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem and archives.
//! This module is the only place where side effects occur.

pub mod archive;
pub mod dirs;
pub mod download;
pub mod filesystem;
