//! GitHub endpoints

/// GitHub REST API base URL
pub const GITHUB_API: &str = "https://api.github.com";

/// Raw file content base URL (default-branch files)
pub const GITHUB_RAW: &str = "https://raw.githubusercontent.com";

/// Value of the `X-GitHub-Api-Version` header sent with authenticated calls
pub const GITHUB_API_VERSION: &str = "2022-11-28";
