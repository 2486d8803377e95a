use crate::auth::Credentials;
use crate::error::{Result, StarsError};
use crate::models::{RateLimitState, RepoStats};
use crate::types::{GitHubErrorBody, GitHubRateLimit, GitHubRepo};
use crate::updater::StatsSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl GitHubClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, API_BASE_URL)
    }

    /// Client against a different API root, e.g. GitHub Enterprise or a
    /// local mock server.
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| StarsError::InvalidRepoUrl(format!("{}: {}", base_url, e)))?;
        // Url::join drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("project-stars/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GitHubClient {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue one GET and classify the response. No retries happen here; the
    /// caller decides what each error kind means.
    async fn make_request(&self, path: &str) -> Result<Response> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| StarsError::InvalidRepoUrl(format!("{}: {}", path, e)))?;

        let request = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json");
        let response = self.credentials.apply(request).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(StarsError::NotFound(url.to_string())),
            status => {
                let rate_limit = Self::get_rate_limit_state(&response);
                let body: GitHubErrorBody = response.json().await.unwrap_or_default();

                if Self::is_rate_limit_response(status, rate_limit.as_ref(), &body.message) {
                    return Err(StarsError::RateLimitExceeded {
                        message: body.message,
                        reset_time: rate_limit.map(|state| state.reset_time),
                    });
                }

                Err(StarsError::ApiError {
                    status: status.as_u16(),
                    message: body.message,
                })
            }
        }
    }

    fn is_rate_limit_response(
        status: StatusCode,
        rate_limit: Option<&RateLimitState>,
        message: &str,
    ) -> bool {
        if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
            return false;
        }
        rate_limit.map_or(false, |state| state.is_limited)
            || message.to_lowercase().contains("rate limit")
    }

    /// Query the rate limit status endpoint for the core quota.
    pub async fn get_rate_limit(&self) -> Result<RateLimitState> {
        let response = self.make_request("rate_limit").await?;
        let body: GitHubRateLimit = response.json().await?;
        let core = body.resources.core;

        Ok(RateLimitState {
            remaining: core.remaining,
            limit: core.limit,
            reset_time: timestamp_to_utc(core.reset),
            is_limited: core.remaining == 0,
        })
    }

    /// Rate limit state from response headers. `None` unless all three
    /// X-RateLimit headers are present and parse.
    pub fn get_rate_limit_state(response: &Response) -> Option<RateLimitState> {
        let headers = response.headers();
        let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

        let remaining = header("X-RateLimit-Remaining")?.parse::<u32>().ok()?;
        let limit = header("X-RateLimit-Limit")?.parse::<u32>().ok()?;
        let reset = header("X-RateLimit-Reset")?.parse::<i64>().ok()?;

        Some(RateLimitState {
            remaining,
            limit,
            reset_time: timestamp_to_utc(reset),
            is_limited: remaining == 0,
        })
    }
}

fn timestamp_to_utc(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
}

#[async_trait]
impl StatsSource for GitHubClient {
    async fn fetch_stats(&self, repo_path: &str) -> Result<RepoStats> {
        debug!("Fetching data for {}", repo_path);
        let response = self.make_request(&format!("repos/{}", repo_path)).await?;
        let rate_limit = Self::get_rate_limit_state(&response);
        let repo: GitHubRepo = response.json().await?;

        Ok(RepoStats {
            stars_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            rate_limit,
        })
    }

    async fn rate_limit(&self) -> Result<RateLimitState> {
        self.get_rate_limit().await
    }
}
