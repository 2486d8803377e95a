use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarsError {
    #[error("GitHub API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        message: String,
        reset_time: Option<DateTime<Utc>>,
    },

    #[error("Invalid repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("No GitHub URL found for {0}")]
    MissingRepoUrl(String),

    #[error("{0} does not contain a JSON array at the top level")]
    NotAnArray(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Logging setup error: {0}")]
    LoggingError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl StarsError {
    /// A 404 from the API; retrying cannot help.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StarsError::NotFound(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StarsError::RateLimitExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, StarsError>;
