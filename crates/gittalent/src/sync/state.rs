//! Observable sync state.

use std::sync::Arc;

use crate::github::GitHubError;
use crate::profile::ProfileError;
use crate::snapshot::GitHubProfileSnapshot;

/// Class of a failed sync, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    NotFound,
    RateLimited,
    Upstream,
    Network,
    Persistence,
}

/// A failed sync with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Handle the failing request was for. Empty for profile lookups.
    pub handle: String,
    pub kind: SyncErrorKind,
    pub message: String,
}

impl SyncFailure {
    pub fn new(handle: &str, kind: SyncErrorKind, message: impl Into<String>) -> Self {
        Self {
            handle: handle.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// Classify a GitHub failure for `handle`.
    pub fn from_github(handle: &str, error: &GitHubError) -> Self {
        let (kind, message) = match error {
            GitHubError::InvalidHandle if handle.trim().is_empty() => (
                SyncErrorKind::NotFound,
                "A GitHub handle is required".to_string(),
            ),
            GitHubError::InvalidHandle => (
                SyncErrorKind::NotFound,
                format!("'{handle}' is not a valid GitHub handle"),
            ),
            GitHubError::InvalidRepoName { .. } => (
                SyncErrorKind::Upstream,
                "GitHub returned an unexpected repository name".to_string(),
            ),
            GitHubError::NotFound { .. } => (
                SyncErrorKind::NotFound,
                format!("GitHub user '{handle}' was not found"),
            ),
            GitHubError::RateLimited { reset_at } => (
                SyncErrorKind::RateLimited,
                match reset_at {
                    Some(at) => format!(
                        "GitHub rate limit reached. Try again after {}",
                        at.format("%H:%M UTC")
                    ),
                    None => "GitHub rate limit reached. Try again later".to_string(),
                },
            ),
            GitHubError::Upstream { status, .. } => (
                SyncErrorKind::Upstream,
                format!("GitHub returned an error (HTTP {status})"),
            ),
            GitHubError::Json(_) => (
                SyncErrorKind::Upstream,
                "GitHub returned an unexpected response".to_string(),
            ),
            GitHubError::Network(_) => (
                SyncErrorKind::Network,
                "Could not reach GitHub".to_string(),
            ),
        };
        Self::new(handle, kind, message)
    }

    pub fn from_profile(handle: &str, error: &ProfileError) -> Self {
        let kind = match error {
            ProfileError::NotFound { .. } => SyncErrorKind::NotFound,
            ProfileError::Database(_) | ProfileError::InvalidData { .. } => {
                SyncErrorKind::Persistence
            }
        };
        Self::new(handle, kind, error.to_string())
    }
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SyncFailure {}

/// Result of one handle sync.
pub type SnapshotResult = Result<Arc<GitHubProfileSnapshot>, SyncFailure>;

/// Current state of the sync service.
///
/// A handle is either idle, loading, loaded, or failed. There is no state in
/// which a snapshot and an error are held at the same time.
#[derive(Debug, Clone, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Loading {
        handle: String,
    },
    Success(Arc<GitHubProfileSnapshot>),
    Error(SyncFailure),
}

impl SyncState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn loading_handle(&self) -> Option<&str> {
        match self {
            Self::Loading { handle } => Some(handle),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<GitHubProfileSnapshot>> {
        match self {
            Self::Success(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SyncFailure> {
        match self {
            Self::Error(failure) => Some(failure),
            _ => None,
        }
    }

    /// Handle the state refers to, if any.
    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { handle } => Some(handle),
            Self::Success(snapshot) => Some(&snapshot.handle),
            Self::Error(failure) => Some(&failure.handle),
        }
    }

    /// Enter `Loading` for `handle`. Any previous state is replaced.
    pub fn begin(&mut self, handle: &str) {
        *self = Self::Loading {
            handle: handle.to_string(),
        };
    }

    /// Apply a completed request.
    ///
    /// Returns `false` and leaves the state alone when `handle` is no longer
    /// the one loading.
    pub fn complete(&mut self, handle: &str, result: SnapshotResult) -> bool {
        match self {
            Self::Loading { handle: current } if current.eq_ignore_ascii_case(handle) => {
                *self = match result {
                    Ok(snapshot) => Self::Success(snapshot),
                    Err(failure) => Self::Error(failure),
                };
                true
            }
            _ => false,
        }
    }

    /// Return to `Idle` if the state refers to `handle` and is settled.
    pub fn reset_if_for(&mut self, handle: &str) -> bool {
        let settled_for_handle = !self.is_loading()
            && self
                .handle()
                .is_some_and(|h| h.eq_ignore_ascii_case(handle));
        if settled_for_handle {
            *self = Self::Idle;
        }
        settled_for_handle
    }
}
