//! Client for the installation proxy.
//!
//! When a developer has installed the GitTalent GitHub App, profile data is
//! fetched through a server-side proxy that holds the installation token.
//! The proxy returns an already aggregated profile in one round-trip.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::client::{USER_AGENT, sort_public_by_update, validate_handle};
use super::error::{GitHubError, short_error_message};
use super::types::{GitHubRepo, GitHubUser};
use crate::aggregate::{self, Aggregation};
use crate::contributions::{self, ContributionDay, validate_calendar};
use crate::http::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::snapshot::GitHubProfileSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    handle: &'a str,
    installation_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyResponse {
    user: GitHubUser,
    #[serde(default)]
    repos: Vec<GitHubRepo>,
    #[serde(default)]
    languages: HashMap<String, u64>,
    #[serde(default)]
    total_stars: Option<u64>,
    #[serde(default)]
    contributions: Option<Vec<ContributionDay>>,
}

/// Fetches profile snapshots through the installation proxy.
#[derive(Clone)]
pub struct InstallationProxyClient {
    transport: Arc<dyn HttpTransport>,
    url: String,
    api_key: Option<String>,
}

impl InstallationProxyClient {
    pub fn new(url: &str, api_key: Option<&str>, timeout: StdDuration) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Network(e.to_string()))?;
        Ok(Self::new_with_transport(url, api_key, Arc::new(transport)))
    }

    pub fn new_with_transport(
        url: &str,
        api_key: Option<&str>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch a snapshot for `handle` using the given installation.
    ///
    /// A calendar that is missing or malformed is replaced by a locally
    /// synthesized one for `today`.
    pub async fn fetch_snapshot(
        &self,
        handle: &str,
        installation_id: i64,
        today: NaiveDate,
    ) -> Result<GitHubProfileSnapshot, GitHubError> {
        let handle = validate_handle(handle)?;

        let body = serde_json::to_value(ProxyRequest {
            handle,
            installation_id,
        })?;
        let mut request = HttpRequest::post_json(&self.url, &body).with_header("User-Agent", USER_AGENT);
        if let Some(key) = &self.api_key {
            request = request.with_header("Authorization", format!("Bearer {key}"));
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Network(short_error_message(&e)))?;

        if !response.is_success() {
            tracing::debug!(
                handle = %handle,
                installation_id,
                status = response.status,
                "Installation proxy request failed"
            );
            return Err(GitHubError::from_status(
                response.status,
                handle,
                None,
                response.body_excerpt(),
            ));
        }

        let payload: ProxyResponse = serde_json::from_slice(&response.body)?;
        let repos = sort_public_by_update(payload.repos);
        let total_stars = payload
            .total_stars
            .unwrap_or_else(|| aggregate::total_stars(&repos));

        let contributions = match payload.contributions {
            Some(days) => match validate_calendar(&days) {
                Ok(()) => days,
                Err(defect) => {
                    tracing::warn!(
                        handle = %handle,
                        ?defect,
                        "Proxy calendar is invalid, synthesizing locally"
                    );
                    contributions::synthesize(handle, &repos, today)
                }
            },
            None => {
                tracing::warn!(handle = %handle, "Proxy returned no calendar, synthesizing locally");
                contributions::synthesize(handle, &repos, today)
            }
        };

        Ok(GitHubProfileSnapshot {
            handle: handle.to_string(),
            user: payload.user,
            languages: Aggregation::from_bytes(payload.languages, total_stars),
            total_stars,
            repos,
            contributions,
            fetched_at: Utc::now(),
        })
    }
}
