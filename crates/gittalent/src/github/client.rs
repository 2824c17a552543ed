//! GitHub REST client.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::{GitHubError, short_error_message};
use super::types::{GitHubApi, GitHubRepo, GitHubUser, LanguageBreakdown, MAX_REPOS, RateLimitInfo};
use crate::http::{HttpHeaders, HttpRequest, HttpTransport, ReqwestTransport, header_get};

/// Public GitHub API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// `Accept` header value required by the v3 REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = "gittalent";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// GitHub API client implementing [`GitHubApi`].
///
/// No retries are attempted: each call issues exactly one request and a
/// failure is returned to the caller as-is.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: Option<String>,
    last_rate_limit: Arc<Mutex<Option<RateLimitInfo>>>,
}

impl GitHubClient {
    /// Create a client for api.github.com backed by reqwest.
    pub fn new(token: Option<&str>, timeout: StdDuration) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Network(e.to_string()))?;
        Ok(Self::new_with_transport(
            GITHUB_API_BASE,
            token,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        api_base: &str,
        token: Option<&str>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(String::from),
            last_rate_limit: Arc::new(Mutex::new(None)),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Rate limit reported by the most recent response, if any.
    pub fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.last_rate_limit
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn record_rate_limit(&self, headers: &HttpHeaders) {
        if let Some(info) = parse_rate_limit_headers(headers)
            && let Ok(mut slot) = self.last_rate_limit.lock()
        {
            *slot = Some(info);
        }
    }

    /// Issue a GET and decode a 2xx body.
    ///
    /// `resource` names what was requested and ends up in `NotFound` errors.
    async fn get<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.api_base, path);

        let mut request = HttpRequest::get(url)
            .with_header("Accept", GITHUB_ACCEPT)
            .with_header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.with_header("Authorization", format!("Bearer {token}"));
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Network(short_error_message(&e)))?;

        self.record_rate_limit(&response.headers);

        if !response.is_success() {
            tracing::debug!(path, status = response.status, "GitHub request failed");
            return Err(GitHubError::from_status(
                response.status,
                resource,
                rate_limit_reset(&response.headers),
                response.body_excerpt(),
            ));
        }

        serde_json::from_slice(&response.body).map_err(GitHubError::from)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_user(&self, handle: &str) -> Result<GitHubUser, GitHubError> {
        let handle = validate_handle(handle)?;
        self.get(&format!("/users/{handle}"), handle).await
    }

    async fn list_user_repos(&self, handle: &str) -> Result<Vec<GitHubRepo>, GitHubError> {
        let handle = validate_handle(handle)?;
        let repos: Vec<GitHubRepo> = self
            .get(
                &format!("/users/{handle}/repos?sort=updated&per_page={MAX_REPOS}&type=public"),
                handle,
            )
            .await?;

        Ok(sort_public_by_update(repos))
    }

    async fn repo_languages(&self, full_name: &str) -> Result<LanguageBreakdown, GitHubError> {
        let full_name = validate_full_name(full_name)?;
        self.get(&format!("/repos/{full_name}/languages"), full_name)
            .await
    }
}

/// Reject handles that are empty or could escape their URL path segment.
///
/// GitHub logins are ASCII letters, digits and hyphens.
pub fn validate_handle(handle: &str) -> Result<&str, GitHubError> {
    let handle = handle.trim();
    let valid = !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(GitHubError::InvalidHandle);
    }
    Ok(handle)
}

/// Accept only `owner/name` where both parts are plain path segments.
pub fn validate_full_name(full_name: &str) -> Result<&str, GitHubError> {
    let invalid = || GitHubError::InvalidRepoName {
        full_name: full_name.to_string(),
    };
    let (owner, name) = full_name.split_once('/').ok_or_else(invalid)?;
    validate_handle(owner).map_err(|_| invalid())?;
    let name_ok = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !name_ok || owner.len() != owner.trim().len() {
        return Err(invalid());
    }
    Ok(full_name)
}

/// Keep public repositories, newest update first, capped at [`MAX_REPOS`].
///
/// The API already sorts by `updated`; sorting again keeps the order stable
/// when a proxy or fixture hands back repositories unordered.
pub fn sort_public_by_update(mut repos: Vec<GitHubRepo>) -> Vec<GitHubRepo> {
    repos.retain(|r| !r.private);
    repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    repos.truncate(MAX_REPOS);
    repos
}

fn rate_limit_reset(headers: &HttpHeaders) -> Option<DateTime<Utc>> {
    header_get(headers, "x-ratelimit-reset")?
        .parse::<i64>()
        .ok()
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
}

/// Extract rate limit info from GitHub response headers.
fn parse_rate_limit_headers(headers: &HttpHeaders) -> Option<RateLimitInfo> {
    let limit = header_get(headers, "x-ratelimit-limit")?
        .parse::<usize>()
        .ok()?;
    let remaining = header_get(headers, "x-ratelimit-remaining")?
        .parse::<usize>()
        .ok()?;
    let reset_at = rate_limit_reset(headers).unwrap_or_else(Utc::now);
    Some(RateLimitInfo {
        limit,
        remaining,
        reset_at,
    })
}
