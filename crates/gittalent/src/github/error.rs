//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to GitHub (directly or via the proxy).
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The handle was empty or not a GitHub login; rejected before any request is made.
    #[error("GitHub handle must be non-empty letters, digits and hyphens")]
    InvalidHandle,

    /// A repository name that cannot form a `/repos/{owner}/{name}` path.
    #[error("Invalid repository name: {full_name}")]
    InvalidRepoName { full_name: String },

    /// HTTP 404 from the upstream.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// HTTP 403 or 429 from the upstream.
    #[error("Rate limit exceeded{}", reset_suffix(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// Any other non-2xx status.
    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx body that could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(". Resets at {at}"),
        None => String::new(),
    }
}

impl GitHubError {
    /// Map a non-2xx status to the matching error class.
    pub fn from_status(
        status: u16,
        resource: &str,
        reset_at: Option<DateTime<Utc>>,
        message: String,
    ) -> Self {
        match status {
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            403 | 429 => Self::RateLimited { reset_at },
            _ => Self::Upstream { status, message },
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Extract a short error message suitable for logs.
///
/// Takes the first line of the rendered error.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_maps_404_to_not_found_with_resource() {
        let err = GitHubError::from_status(404, "octocat", None, String::new());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("octocat"));
    }

    #[test]
    fn from_status_maps_403_and_429_to_rate_limited() {
        assert!(GitHubError::from_status(403, "x", None, String::new()).is_rate_limited());
        assert!(GitHubError::from_status(429, "x", None, String::new()).is_rate_limited());
    }

    #[test]
    fn from_status_keeps_other_statuses_as_upstream() {
        let err = GitHubError::from_status(502, "x", None, "bad gateway".to_string());
        match err {
            GitHubError::Upstream { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn rate_limited_message_includes_reset_time_when_known() {
        let reset_at = DateTime::from_timestamp(2_000_000_000, 0).expect("valid timestamp");
        let err = GitHubError::RateLimited {
            reset_at: Some(reset_at),
        };
        assert!(err.to_string().contains("Resets at 2033"));

        let err = GitHubError::RateLimited { reset_at: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn short_error_message_takes_first_line() {
        let err = GitHubError::Network("connection reset\ncaused by: eof".to_string());
        assert_eq!(short_error_message(&err), "Network error: connection reset");
    }
}
