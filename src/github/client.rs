//! GitHub client implementation
//!
//! Queries the REST API for latest releases and default branches. A token,
//! when present, is attached to every call; without one the calls still go
//! out, just under the anonymous rate limit.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::{defaults, urls};
use crate::error::DownloadError;
use crate::github::models::{Release, Repository};

/// GitHub API client
#[derive(Debug, Clone)]
pub struct GithubClient {
    /// HTTP client
    client: reqwest::Client,
    /// REST API base URL
    api_url: String,
    /// Raw content base URL
    raw_url: String,
    /// Personal access token
    token: Option<String>,
}

impl GithubClient {
    /// Create a client talking to github.com
    pub fn new(token: Option<String>) -> Self {
        Self::with_urls(urls::GITHUB_API.to_string(), urls::GITHUB_RAW.to_string(), token)
    }

    /// Create a client with custom API and raw-content URLs
    pub fn with_urls(api_url: String, raw_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(defaults::USER_AGENT)
                .timeout(defaults::API_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_url: api_url.trim_end_matches('/').to_string(),
            raw_url: raw_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Whether calls are authenticated
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Latest release of `repo`, or `None` if the API did not return one
    pub async fn latest_release(&self, repo: &str) -> Result<Option<Release>, DownloadError> {
        let url = format!("{}/repos/{repo}/releases/latest", self.api_url);
        self.get_json(&url).await
    }

    /// Default branch of `repo`, or `None` if it could not be determined
    pub async fn default_branch(&self, repo: &str) -> Result<Option<String>, DownloadError> {
        let url = format!("{}/repos/{repo}", self.api_url);
        let repository: Option<Repository> = self.get_json(&url).await?;
        Ok(repository.and_then(|r| r.default_branch))
    }

    /// URL of `file` on `branch` of `repo`
    pub fn raw_file_url(&self, repo: &str, branch: &str, file: &str) -> String {
        format!(
            "{}/{repo}/{branch}/{}",
            self.raw_url,
            file.trim_start_matches('/')
        )
    }

    /// GET `url` and decode the JSON body
    ///
    /// Status codes other than 200 and undecodable bodies are reported and
    /// yield `Ok(None)`. Only transport failures are errors.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, DownloadError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header("X-GitHub-Api-Version", urls::GITHUB_API_VERSION);
        }

        tracing::debug!("GET {url}");
        let response = request.send().await.map_err(|e| DownloadError::Api {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        if response.status() != StatusCode::OK {
            println!(
                "GitHub API Request failed. Status code: {}",
                response.status().as_u16()
            );
            return Ok(None);
        }

        match response.json::<T>().await {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                tracing::warn!("Unexpected response from '{url}': {e}");
                Ok(None)
            }
        }
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new(None)
    }
}
