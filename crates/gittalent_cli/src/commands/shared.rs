use std::sync::Arc;

use gittalent::github::{GITHUB_API_BASE, GitHubClient, InstallationProxyClient};
use gittalent::http::ReqwestTransport;

use crate::config::Config;

/// GitHub client honoring the configured token, API base and timeout.
pub(crate) fn github_client(config: &Config) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let token = config.github_token();
    if token.is_none() {
        tracing::warn!("No GitHub token configured; requests are limited to 60 per hour");
    }

    let client = match config.github.api_base.as_deref() {
        Some(base) if base.trim_end_matches('/') != GITHUB_API_BASE => {
            let transport = ReqwestTransport::with_timeout(config.http_timeout())?;
            GitHubClient::new_with_transport(base, token.as_deref(), Arc::new(transport))
        }
        _ => GitHubClient::new(token.as_deref(), config.http_timeout())?,
    };
    Ok(client)
}

/// Installation proxy client, when a proxy URL is configured.
pub(crate) fn proxy_client(
    config: &Config,
) -> Result<Option<InstallationProxyClient>, Box<dyn std::error::Error>> {
    let Some(url) = config.proxy.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return Ok(None);
    };
    let proxy =
        InstallationProxyClient::new(url, config.proxy.api_key.as_deref(), config.http_timeout())?;
    Ok(Some(proxy))
}

/// Comma-separated list, or a dash when empty.
pub(crate) fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
