//! Refresh `stars_count` / `forks_count` of repository records from the
//! GitHub API.
//!
//! Repositories are processed one after another. Each one gets a small retry
//! loop: rate limiting waits until the quota resets and does not use up an
//! attempt, a 404 gives up at once, and anything else backs off exponentially
//! until `max_retries` failed attempts have been made.

use crate::error::{Result, StarsError};
use crate::models::{wait_until, ProjectFields, RateLimitState, Record, RepoStats, StatsChange};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

pub const GITHUB_HOST: &str = "github.com";
pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

/// Where current repository counts come from.
#[async_trait]
pub trait StatsSource {
    /// Current counts for `owner/name`.
    async fn fetch_stats(&self, repo_path: &str) -> Result<RepoStats>;

    /// Current state of the API quota.
    async fn rate_limit(&self) -> Result<RateLimitState>;
}

#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Failed attempts (other than rate limiting) before giving up on a
    /// repository.
    pub max_retries: u32,
    /// Backoff timer start value. It is doubled before every wait, so the
    /// first wait is twice this.
    pub initial_backoff: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepoOutcome {
    Updated(StatsChange),
    NotFound,
    RetriesExhausted,
    /// Never reached the API: no usable GitHub URL, or not an object.
    Skipped(String),
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoUpdate {
    pub outcome: RepoOutcome,
    pub failed_attempts: u32,
    pub rate_limit_waits: u32,
}

impl RepoUpdate {
    fn skipped(reason: String) -> Self {
        Self {
            outcome: RepoOutcome::Skipped(reason),
            failed_attempts: 0,
            rate_limit_waits: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    pub updated: usize,
    pub not_found: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl UpdateSummary {
    fn record(&mut self, outcome: &RepoOutcome) {
        match outcome {
            RepoOutcome::Updated(_) => self.updated += 1,
            RepoOutcome::NotFound => self.not_found += 1,
            RepoOutcome::RetriesExhausted => self.failed += 1,
            RepoOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// First link pointing at GitHub.
pub fn find_repo_url(record: &Record) -> Option<&str> {
    record
        .link_urls()
        .into_iter()
        .find(|url| url.contains(GITHUB_HOST))
}

/// `https://github.com/owner/name` -> `owner/name`.
pub fn extract_repo_path(github_url: &str) -> Result<String> {
    if !github_url.starts_with(GITHUB_URL_PREFIX) {
        return Err(StarsError::InvalidRepoUrl(github_url.to_string()));
    }

    let url = Url::parse(github_url)
        .map_err(|e| StarsError::InvalidRepoUrl(format!("{}: {}", github_url, e)))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [owner, name] => Ok(format!("{}/{}", owner, name)),
        _ => Err(StarsError::InvalidRepoUrl(github_url.to_string())),
    }
}

pub struct StatsUpdater<S> {
    source: S,
    config: UpdaterConfig,
}

impl<S: StatsSource> StatsUpdater<S> {
    pub fn new(source: S, config: UpdaterConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch counts for `repo_path` and write them into `record`. The record
    /// is left untouched unless the fetch succeeds.
    pub async fn update_repo_stats(&self, repo_path: &str, record: &mut Record) -> RepoUpdate {
        let max_retries = self.config.max_retries;
        let mut failed_attempts = 0;
        let mut rate_limit_waits = 0;
        let mut backoff = self.config.initial_backoff;

        while failed_attempts < max_retries {
            let err = match self.source.fetch_stats(repo_path).await {
                Ok(stats) => {
                    if let Some(rate_limit) = &stats.rate_limit {
                        debug!(
                            "Rate limit: {}/{}, Reset at: {}",
                            rate_limit.remaining, rate_limit.limit, rate_limit.reset_time
                        );
                    }
                    let change = StatsChange {
                        stars_before: record.stars_count().cloned(),
                        forks_before: record.forks_count().cloned(),
                        stars_after: stats.stars_count,
                        forks_after: stats.forks_count,
                    };
                    record.set_counts(stats.stars_count, stats.forks_count);

                    return RepoUpdate {
                        outcome: RepoOutcome::Updated(change),
                        failed_attempts,
                        rate_limit_waits,
                    };
                }
                Err(err) => err,
            };

            if err.is_not_found() {
                error!("Repository {} not found!", repo_path);
                return RepoUpdate {
                    outcome: RepoOutcome::NotFound,
                    failed_attempts,
                    rate_limit_waits,
                };
            }

            if let StarsError::RateLimitExceeded { reset_time, .. } = &err {
                if let Some(wait) = self.rate_limit_wait(*reset_time).await {
                    warn!(
                        "Rate limit exceeded. Waiting for {} seconds until reset.",
                        wait.as_secs()
                    );
                    sleep(wait).await;
                    rate_limit_waits += 1;
                    continue;
                }
            }

            match &err {
                StarsError::ApiError { .. } | StarsError::RateLimitExceeded { .. } => {
                    error!("{}", err)
                }
                _ => error!("Unexpected error: {}", err),
            }

            failed_attempts += 1;
            if failed_attempts >= max_retries {
                break;
            }
            backoff *= 2;
            warn!(
                "Retrying in {} seconds... (Attempt {}/{})",
                backoff.as_secs_f64(),
                failed_attempts,
                max_retries
            );
            sleep(backoff).await;
        }

        error!("Failed to update {} after {} attempts", repo_path, max_retries);
        RepoUpdate {
            outcome: RepoOutcome::RetriesExhausted,
            failed_attempts,
            rate_limit_waits,
        }
    }

    /// Time to wait out a rate limit. Prefers the status endpoint and falls
    /// back to the reset header of the rejected response.
    async fn rate_limit_wait(
        &self,
        header_reset: Option<chrono::DateTime<Utc>>,
    ) -> Option<Duration> {
        match self.source.rate_limit().await {
            Ok(state) => Some(state.wait_until_reset(Utc::now())),
            Err(e) => {
                warn!("Could not query rate limit status: {}", e);
                header_reset.map(|reset| wait_until(reset, Utc::now()))
            }
        }
    }

    /// Resolve the repository behind one record and refresh it.
    pub async fn update_record(&self, label: &str, record: &mut Record) -> RepoUpdate {
        let Some(github_url) = find_repo_url(record) else {
            let err = StarsError::MissingRepoUrl(label.to_string());
            error!("{}", err);
            return RepoUpdate::skipped(err.to_string());
        };

        let repo_path = match extract_repo_path(github_url) {
            Ok(path) => path,
            Err(err) => {
                error!("Error processing {}: {}", label, err);
                return RepoUpdate::skipped(err.to_string());
            }
        };
        info!("Updating stats for {}", repo_path);

        let update = self.update_repo_stats(&repo_path, record).await;
        if let RepoOutcome::Updated(change) = &update.outcome {
            info!(
                "Updated {} - Stars: {} → {}, Forks: {} → {}",
                label,
                display_count(change.stars_before.as_ref()),
                change.stars_after,
                display_count(change.forks_before.as_ref()),
                change.forks_after
            );
        }
        update
    }

    /// Refresh every record in `data`, in order.
    pub async fn update_all(&self, data: &mut [Value]) -> UpdateSummary {
        let mut summary = UpdateSummary {
            total: data.len(),
            ..Default::default()
        };
        info!("Found {} repositories to update", summary.total);

        for (index, entry) in data.iter_mut().enumerate() {
            let position = index + 1;
            let update = match entry.as_object_mut() {
                Some(record) => {
                    let label = record
                        .name_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Repository #{}", position));
                    info!("[{}/{}] Processing {}...", position, summary.total, label);
                    self.update_record(&label, record).await
                }
                None => {
                    error!(
                        "[{}/{}] Entry is not a JSON object, skipping",
                        position, summary.total
                    );
                    RepoUpdate::skipped("not a JSON object".to_string())
                }
            };
            summary.record(&update.outcome);
        }

        summary
    }
}

fn display_count(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_repo_path() {
        assert_eq!(
            extract_repo_path("https://github.com/rust-lang/rust").unwrap(),
            "rust-lang/rust"
        );
        assert_eq!(
            extract_repo_path("https://github.com/tokio-rs/tokio/").unwrap(),
            "tokio-rs/tokio"
        );
    }

    #[test]
    fn test_extract_repo_path_rejects_other_prefixes() {
        for url in [
            "http://github.com/rust-lang/rust",
            "https://www.github.com/rust-lang/rust",
            "https://gitlab.com/github.com/x",
        ] {
            assert!(
                matches!(extract_repo_path(url), Err(StarsError::InvalidRepoUrl(_))),
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_extract_repo_path_requires_owner_and_name() {
        assert!(extract_repo_path("https://github.com/rust-lang").is_err());
        assert!(extract_repo_path("https://github.com/rust-lang/rust/tree/master").is_err());
    }

    #[test]
    fn test_find_repo_url_takes_first_github_link() {
        let record = json!({
            "name": "ripgrep",
            "links": [
                {"url": "https://docs.rs/grep"},
                {"url": "https://github.com/BurntSushi/ripgrep"},
                {"url": "https://github.com/BurntSushi/other"}
            ]
        });
        let record = record.as_object().unwrap();

        assert_eq!(
            find_repo_url(record),
            Some("https://github.com/BurntSushi/ripgrep")
        );
    }

    #[test]
    fn test_display_count() {
        assert_eq!(display_count(None), "unknown");
        assert_eq!(display_count(Some(&json!(12))), "12");
        assert_eq!(display_count(Some(&json!("n/a"))), "n/a");
    }
}
