use serde::Deserialize;

// GitHub API response structures
#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub stargazers_count: u64,
    pub forks_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRateLimit {
    pub resources: GitHubRateLimitResources,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRateLimitResources {
    pub core: GitHubRateLimitWindow,
}

#[derive(Debug, Deserialize)]
pub struct GitHubRateLimitWindow {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp, seconds.
    pub reset: i64,
}

/// Error body GitHub returns alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubErrorBody {
    #[serde(default)]
    pub message: String,
}
