//! GitHub access for profile sync.
//!
//! # Module Structure
//!
//! - [`error`] - `GitHubError` and its status mapping
//! - [`types`] - API payloads and the [`GitHubApi`] trait
//! - [`client`] - REST client for `api.github.com`
//! - [`proxy`] - Installation proxy returning pre-aggregated profiles
//!
//! ```ignore
//! use gittalent::github::{GitHubApi, GitHubClient};
//!
//! let client = GitHubClient::new(Some(&token), DEFAULT_TIMEOUT)?;
//! let repos = client.list_user_repos("octocat").await?;
//! ```

mod client;
mod error;
mod proxy;
mod types;

pub use error::{GitHubError, short_error_message};

pub use types::{GitHubApi, GitHubRepo, GitHubUser, LanguageBreakdown, MAX_REPOS, RateLimitInfo};

pub use client::{
    DEFAULT_TIMEOUT, GITHUB_ACCEPT, GITHUB_API_BASE, GitHubClient, USER_AGENT,
    sort_public_by_update, validate_full_name, validate_handle,
};

pub use proxy::InstallationProxyClient;
