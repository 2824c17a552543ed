//! GitHub API data types.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::GitHubError;

/// Maximum repositories returned by a single listing.
pub const MAX_REPOS: usize = 100;

/// Bytes of source per language, as returned by `/repos/{full_name}/languages`.
pub type LanguageBreakdown = HashMap<String, u64>;

/// A GitHub user from `/users/{handle}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

/// A repository summary from `/users/{handle}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl GitHubRepo {
    /// Whether this is a GitHub Pages site repository (`*.github.io`).
    #[must_use]
    pub fn is_pages_site(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".github.io")
    }

    /// Timestamps that count as repository activity.
    pub fn activity_dates(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        [self.updated_at, self.created_at, self.pushed_at]
            .into_iter()
            .flatten()
    }
}

/// Rate limit information parsed from `x-ratelimit-*` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// When the rate limit resets.
    pub reset_at: DateTime<Utc>,
}

/// Read operations against the GitHub REST API.
///
/// [`GitHubClient`](super::GitHubClient) is the production implementation;
/// the aggregator and snapshot builder only depend on this trait.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /users/{handle}`.
    async fn get_user(&self, handle: &str) -> Result<GitHubUser, GitHubError>;

    /// Up to [`MAX_REPOS`] public repositories, most recently updated first.
    async fn list_user_repos(&self, handle: &str) -> Result<Vec<GitHubRepo>, GitHubError>;

    /// `GET /repos/{full_name}/languages`.
    async fn repo_languages(&self, full_name: &str) -> Result<LanguageBreakdown, GitHubError>;
}
