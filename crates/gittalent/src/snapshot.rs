//! Point-in-time view of a GitHub profile.

use chrono::{DateTime, NaiveDate, Utc};

use crate::aggregate::{self, Aggregation};
use crate::contributions::{self, ContributionDay};
use crate::github::{GitHubApi, GitHubError, GitHubRepo, GitHubUser, validate_handle};
use crate::sync::SyncOptions;

/// Everything one sync learned about a handle.
///
/// Built fresh for every sync and shared behind an `Arc`; only the derived
/// language and project lists are ever persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubProfileSnapshot {
    /// Handle the snapshot was requested for, as given by the caller.
    pub handle: String,
    pub user: GitHubUser,
    /// Public repositories, most recently updated first.
    pub repos: Vec<GitHubRepo>,
    pub languages: Aggregation,
    pub total_stars: u64,
    /// Synthetic 365-day calendar, oldest first.
    pub contributions: Vec<ContributionDay>,
    pub fetched_at: DateTime<Utc>,
}

impl GitHubProfileSnapshot {
    #[must_use]
    pub fn top_languages(&self, n: usize) -> Vec<String> {
        self.languages.top_languages(n)
    }

    #[must_use]
    pub fn top_projects(&self, m: usize) -> Vec<String> {
        aggregate::top_projects(&self.repos, m)
    }

    /// Days in the calendar with at least one contribution.
    #[must_use]
    pub fn active_days(&self) -> usize {
        self.contributions.iter().filter(|d| d.count > 0).count()
    }

    /// Whether this snapshot belongs to `handle` (ASCII case-insensitive).
    #[must_use]
    pub fn is_for(&self, handle: &str) -> bool {
        self.handle.eq_ignore_ascii_case(handle.trim())
    }
}

/// Fetch user, repositories and languages, then synthesize the calendar.
///
/// The user lookup runs first so a missing handle fails before any
/// repository traffic.
pub async fn fetch_snapshot<A>(
    api: &A,
    handle: &str,
    options: &SyncOptions,
    today: NaiveDate,
) -> Result<GitHubProfileSnapshot, GitHubError>
where
    A: GitHubApi + ?Sized,
{
    let handle = validate_handle(handle)?;

    let user = api.get_user(handle).await?;
    let repos = api.list_user_repos(handle).await?;
    tracing::debug!(handle = %handle, repos = repos.len(), "Fetched repositories");

    let languages = aggregate::aggregate(api, &repos, options.language_fetch_limit).await;
    let contributions = contributions::synthesize(handle, &repos, today);

    Ok(GitHubProfileSnapshot {
        handle: handle.to_string(),
        user,
        total_stars: languages.total_stars,
        languages,
        repos,
        contributions,
        fetched_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::contributions::CALENDAR_DAYS;
    use crate::github::LanguageBreakdown;

    #[derive(Default)]
    struct FakeGitHub {
        user: Option<GitHubUser>,
        repos: Vec<GitHubRepo>,
        languages: HashMap<String, LanguageBreakdown>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGitHub {
        fn record(&self, call: String) {
            self.calls.lock().expect("calls lock").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl GitHubApi for FakeGitHub {
        async fn get_user(&self, handle: &str) -> Result<GitHubUser, GitHubError> {
            self.record(format!("user:{handle}"));
            self.user.clone().ok_or(GitHubError::NotFound {
                resource: handle.to_string(),
            })
        }

        async fn list_user_repos(&self, handle: &str) -> Result<Vec<GitHubRepo>, GitHubError> {
            self.record(format!("repos:{handle}"));
            Ok(self.repos.clone())
        }

        async fn repo_languages(&self, full_name: &str) -> Result<LanguageBreakdown, GitHubError> {
            self.record(format!("languages:{full_name}"));
            self.languages
                .get(full_name)
                .cloned()
                .ok_or(GitHubError::Upstream {
                    status: 500,
                    message: "boom".to_string(),
                })
        }
    }

    fn user(login: &str) -> GitHubUser {
        serde_json::from_value(serde_json::json!({ "login": login })).expect("user")
    }

    fn repo(name: &str, stars: u32, language: Option<&str>) -> GitHubRepo {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "full_name": format!("dev/{name}"),
            "html_url": format!("https://github.com/dev/{name}"),
            "stargazers_count": stars,
            "language": language,
            "updated_at": "2026-09-01T00:00:00Z",
        }))
        .expect("repo")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    #[tokio::test]
    async fn builds_snapshot_from_all_sources() {
        let api = FakeGitHub {
            user: Some(user("dev")),
            repos: vec![repo("api", 10, Some("Rust")), repo("web", 3, Some("TypeScript"))],
            languages: HashMap::from([
                ("dev/api".to_string(), HashMap::from([("Rust".to_string(), 900)])),
                (
                    "dev/web".to_string(),
                    HashMap::from([("TypeScript".to_string(), 400)]),
                ),
            ]),
            ..FakeGitHub::default()
        };

        let snapshot = fetch_snapshot(&api, " dev ", &SyncOptions::default(), today())
            .await
            .expect("snapshot");

        assert_eq!(snapshot.handle, "dev");
        assert_eq!(snapshot.total_stars, 13);
        assert_eq!(snapshot.top_languages(15), vec!["Rust", "TypeScript"]);
        assert_eq!(
            snapshot.top_projects(8),
            vec!["https://github.com/dev/api", "https://github.com/dev/web"]
        );
        assert_eq!(snapshot.contributions.len(), CALENDAR_DAYS);
        assert!(snapshot.is_for("DEV"));
    }

    #[tokio::test]
    async fn missing_user_stops_before_repository_calls() {
        let api = FakeGitHub::default();
        let err = fetch_snapshot(&api, "ghost", &SyncOptions::default(), today())
            .await
            .expect_err("missing user should fail");

        assert!(err.is_not_found());
        assert!(err.to_string().contains("ghost"));
        assert_eq!(api.calls(), vec!["user:ghost"]);
    }

    #[tokio::test]
    async fn honours_language_fetch_limit() {
        let api = FakeGitHub {
            user: Some(user("dev")),
            repos: (0..5)
                .map(|i| repo(&format!("r{i}"), 0, Some("Go")))
                .collect(),
            ..FakeGitHub::default()
        };
        let options = SyncOptions {
            language_fetch_limit: 2,
            ..SyncOptions::default()
        };

        let snapshot = fetch_snapshot(&api, "dev", &options, today())
            .await
            .expect("snapshot");

        let lookups = api
            .calls()
            .iter()
            .filter(|c| c.starts_with("languages:"))
            .count();
        assert_eq!(lookups, 2);
        assert_eq!(snapshot.languages.fallback_count, 2);
    }
}
