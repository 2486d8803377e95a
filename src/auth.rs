use crate::error::{Result, StarsError};
use reqwest::RequestBuilder;
use std::fmt;
use tracing::{info, warn};

/// How requests to the GitHub API authenticate.
///
/// Resolved once, before the first request, from the command line or the
/// environment.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token, sent as a bearer token.
    Token(String),
    /// Username and password over HTTP basic auth. Deprecated by GitHub and
    /// only kept as a fallback.
    Basic { username: String, password: String },
}

impl Credentials {
    /// Pick credentials from the configured options. A token always wins;
    /// username/password are only used when no token is given.
    pub fn resolve(
        token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        if let Some(token) = token.and_then(normalize_token) {
            info!("Using GitHub token for authentication");
            return Ok(Credentials::Token(token.to_string()));
        }

        match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => {
                info!("Token not provided, using username/password authentication");
                warn!(
                    "Username/password authentication is deprecated. Consider using a token instead."
                );
                Ok(Credentials::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            (Some(_), None) => Err(StarsError::AuthError(
                "username given without a password".to_string(),
            )),
            (None, Some(_)) => Err(StarsError::AuthError(
                "password given without a username".to_string(),
            )),
            (None, None) => Err(StarsError::AuthError(
                "no credentials: pass --token or set GITHUB_TOKEN".to_string(),
            )),
        }
    }

    /// Attach the Authorization header to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Accepts a raw token as well as one pasted together with its scheme
/// (`Bearer ...` or `token ...`).
fn normalize_token(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("token "))
        .unwrap_or(raw)
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
