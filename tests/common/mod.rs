#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use project_stars::error::{Result, StarsError};
use project_stars::models::{RateLimitState, RepoStats};
use project_stars::updater::StatsSource;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Stats source that replays a fixed sequence of responses.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<RepoStats>>>,
    reset_time: DateTime<Utc>,
    rate_limit_available: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<RepoStats>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            reset_time: Utc::now() + chrono::Duration::seconds(30),
            rate_limit_available: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reset_time(mut self, reset_time: DateTime<Utc>) -> Self {
        self.reset_time = reset_time;
        self
    }

    /// Make the rate limit status endpoint fail.
    pub fn without_rate_limit_endpoint(mut self) -> Self {
        self.rate_limit_available = false;
        self
    }

    /// Repository paths requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch_stats(&self, repo_path: &str) -> Result<RepoStats> {
        self.calls.lock().unwrap().push(repo_path.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StarsError::ApiError {
                status: 500,
                message: "script exhausted".to_string(),
            }))
    }

    async fn rate_limit(&self) -> Result<RateLimitState> {
        if !self.rate_limit_available {
            return Err(StarsError::ApiError {
                status: 503,
                message: "rate limit endpoint down".to_string(),
            });
        }
        Ok(RateLimitState {
            remaining: 0,
            limit: 5000,
            reset_time: self.reset_time,
            is_limited: true,
        })
    }
}

pub fn stats(stars_count: u64, forks_count: u64) -> Result<RepoStats> {
    Ok(RepoStats {
        stars_count,
        forks_count,
        rate_limit: None,
    })
}

pub fn rate_limited() -> Result<RepoStats> {
    Err(StarsError::RateLimitExceeded {
        message: "API rate limit exceeded".to_string(),
        reset_time: None,
    })
}

pub fn server_error() -> Result<RepoStats> {
    Err(StarsError::ApiError {
        status: 502,
        message: "Bad Gateway".to_string(),
    })
}

pub fn not_found() -> Result<RepoStats> {
    Err(StarsError::NotFound("repos/ghost/gone".to_string()))
}

/// Write `value` as JSON into `dir/name` and return the path.
pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
