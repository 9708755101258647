//! GitHub API client
//!
//! Resolves release assets and default branches for repositories hosted on
//! GitHub.

pub mod client;
pub mod models;

pub use client::GithubClient;
