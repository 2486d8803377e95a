use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::time::Duration;

/// A project or repository entry exactly as it appears in a data file.
///
/// Records stay untyped so that fields this tool does not know about, and
/// their key order, survive a load/save cycle untouched.
pub type Record = Map<String, Value>;

/// Typed access to the handful of fields the merger and updater care about.
pub trait ProjectFields {
    fn name(&self) -> Option<&Value>;

    /// The name when it is a JSON string.
    fn name_str(&self) -> Option<&str>;

    fn stars_count(&self) -> Option<&Value>;

    fn forks_count(&self) -> Option<&Value>;

    /// `url` of every entry in `links`, in order. Entries without a string
    /// `url` are ignored.
    fn link_urls(&self) -> Vec<&str>;

    fn set_counts(&mut self, stars_count: u64, forks_count: u64);
}

impl ProjectFields for Record {
    fn name(&self) -> Option<&Value> {
        self.get("name")
    }

    fn name_str(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    fn stars_count(&self) -> Option<&Value> {
        self.get("stars_count")
    }

    fn forks_count(&self) -> Option<&Value> {
        self.get("forks_count")
    }

    fn link_urls(&self) -> Vec<&str> {
        self.get("links")
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|link| link.get("url").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_counts(&mut self, stars_count: u64, forks_count: u64) {
        self.insert("stars_count".to_string(), Value::from(stars_count));
        self.insert("forks_count".to_string(), Value::from(forks_count));
    }
}

/// Current counts for one repository as reported by the API
#[derive(Debug, Clone, PartialEq)]
pub struct RepoStats {
    pub stars_count: u64,
    pub forks_count: u64,
    /// Rate limit headers of the response that carried the counts, if any.
    pub rate_limit: Option<RateLimitState>,
}

/// Before/after view of a successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsChange {
    pub stars_before: Option<Value>,
    pub forks_before: Option<Value>,
    pub stars_after: u64,
    pub forks_after: u64,
}

/// Rate limit state of the core API quota
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl RateLimitState {
    /// How long to sleep before the quota resets, plus one second of slack.
    /// A reset time already in the past yields just the slack.
    pub fn wait_until_reset(&self, now: DateTime<Utc>) -> Duration {
        wait_until(self.reset_time, now)
    }
}

pub(crate) fn wait_until(reset_time: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let remaining = (reset_time - now).to_std().unwrap_or(Duration::ZERO);
    remaining + Duration::from_secs(1)
}
