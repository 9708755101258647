//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test project context
///
/// A temporary working directory standing in for the folder that holds
/// downloads.toml, the lock file and the generated `sd/` tree.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the sdpack binary against this project
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_sdpack"))
            .arg("--dir")
            .arg(self.path())
            .args(args)
            .env_remove("SDPACK_CACHE_DIR")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute sdpack")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout of a finished command
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr of a finished command
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A loopback URL nobody is listening on
pub fn dead_url(file: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/{file}")
}

/// Write a zip holding `entries` to `path`
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;

    let file = std::fs::File::create(path).expect("Failed to create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("Failed to add dir");
        } else {
            writer.start_file(*name, options).expect("Failed to add file");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write entry");
        }
    }
    writer.finish().expect("Failed to finish zip");
}

/// Serve a latest release of `repo` with `assets` named as given
///
/// Every asset is downloadable from `/download/{tag}/{name}` on the same
/// server and reports `updated_at` as its timestamp.
pub async fn mount_release(
    server: &MockServer,
    repo: &str,
    tag: &str,
    updated_at: &str,
    assets: &[&str],
) {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}/download/{tag}/{name}", server.uri()),
                "updated_at": updated_at,
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/{repo}/releases/latest")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"tag_name": tag, "assets": assets})),
        )
        .mount(server)
        .await;
}

/// Serve `body` at `/download/{tag}/{name}`, expecting exactly `times` hits
pub async fn mount_asset(server: &MockServer, tag: &str, name: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{tag}/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}
