//! Language and star aggregation over a user's repositories.
//!
//! Language weights are *not* on a single scale. A repository whose
//! `/languages` lookup succeeded contributes bytes; one whose lookup failed
//! contributes a single occurrence of its primary language instead. Each
//! [`LanguageWeight`] keeps the two apart so callers can see when a ranking
//! mixes units, while [`Aggregation::top_languages`] still ranks by their sum.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::github::{GitHubApi, GitHubRepo, short_error_message};

/// Forks are ignored unless they have more stars than this.
pub const FORK_STAR_THRESHOLD: u32 = 5;

/// How many filtered repositories get a per-repo `/languages` lookup.
pub const DEFAULT_LANGUAGE_FETCH_LIMIT: usize = 20;

/// What a [`LanguageWeight`] is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Bytes,
    Occurrences,
    Mixed,
}

/// Accumulated weight for one language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageWeight {
    /// Bytes reported by successful `/languages` lookups.
    pub bytes: u64,
    /// Repositories counted by primary language after a failed lookup.
    pub occurrences: u64,
}

impl LanguageWeight {
    #[must_use]
    pub fn unit(&self) -> WeightUnit {
        match (self.bytes > 0, self.occurrences > 0) {
            (true, true) => WeightUnit::Mixed,
            (false, true) => WeightUnit::Occurrences,
            _ => WeightUnit::Bytes,
        }
    }

    /// Value used for ranking: bytes and occurrences summed as-is.
    #[must_use]
    pub fn ranking_value(&self) -> u64 {
        self.bytes.saturating_add(self.occurrences)
    }
}

/// Output of the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Weight per distinct language name.
    pub weights: BTreeMap<String, LanguageWeight>,
    /// Sum of stars over the filtered repositories.
    pub total_stars: u64,
    /// Number of `/languages` lookups that failed and fell back to occurrences.
    pub fallback_count: usize,
}

impl Aggregation {
    /// Build from a byte map already aggregated elsewhere (the installation proxy).
    pub fn from_bytes(bytes: HashMap<String, u64>, total_stars: u64) -> Self {
        let weights = bytes
            .into_iter()
            .map(|(name, bytes)| {
                (
                    name,
                    LanguageWeight {
                        bytes,
                        occurrences: 0,
                    },
                )
            })
            .collect();
        Self {
            weights,
            total_stars,
            fallback_count: 0,
        }
    }

    fn add_bytes(&mut self, language: &str, bytes: u64) {
        let entry = self.weights.entry(language.to_string()).or_default();
        entry.bytes = entry.bytes.saturating_add(bytes);
    }

    fn add_occurrence(&mut self, language: &str) {
        self.weights.entry(language.to_string()).or_default().occurrences += 1;
    }

    /// True when byte-weighted and occurrence-weighted entries are ranked together.
    #[must_use]
    pub fn has_mixed_units(&self) -> bool {
        let any_bytes = self.weights.values().any(|w| w.bytes > 0);
        let any_occurrences = self.weights.values().any(|w| w.occurrences > 0);
        any_bytes && any_occurrences
    }

    /// All languages, heaviest first; equal weights sort by name.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, LanguageWeight)> {
        let mut ranked: Vec<_> = self
            .weights
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.ranking_value()
                .cmp(&a.1.ranking_value())
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }

    /// Names of the `n` heaviest languages.
    #[must_use]
    pub fn top_languages(&self, n: usize) -> Vec<String> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Whether a repository takes part in aggregation.
#[inline]
#[must_use]
pub fn include_repo(repo: &GitHubRepo) -> bool {
    !repo.fork || repo.stargazers_count > FORK_STAR_THRESHOLD
}

/// Repositories that take part in aggregation, in input order.
pub fn filter_repos(repos: &[GitHubRepo]) -> Vec<&GitHubRepo> {
    repos.iter().filter(|r| include_repo(r)).collect()
}

/// Sum of stars over the filtered repositories.
#[must_use]
pub fn total_stars(repos: &[GitHubRepo]) -> u64 {
    filter_repos(repos)
        .iter()
        .map(|r| u64::from(r.stargazers_count))
        .sum()
}

/// Aggregate language weights and stars.
///
/// Lookups are issued one at a time, in repository order, for at most
/// `fetch_limit` filtered repositories. A failed lookup never aborts the run.
pub async fn aggregate<A>(api: &A, repos: &[GitHubRepo], fetch_limit: usize) -> Aggregation
where
    A: GitHubApi + ?Sized,
{
    let filtered = filter_repos(repos);
    let mut aggregation = Aggregation {
        total_stars: filtered
            .iter()
            .map(|r| u64::from(r.stargazers_count))
            .sum(),
        ..Aggregation::default()
    };

    for repo in filtered.iter().take(fetch_limit) {
        let Some(primary) = repo.language.as_deref() else {
            continue;
        };

        match api.repo_languages(&lookup_name(repo)).await {
            Ok(breakdown) => {
                for (language, bytes) in breakdown {
                    aggregation.add_bytes(&language, bytes);
                }
            }
            Err(e) => {
                tracing::debug!(
                    repo = %repo.full_name,
                    language = primary,
                    error = %short_error_message(&e),
                    "Language lookup failed, counting primary language once"
                );
                aggregation.add_occurrence(primary);
                aggregation.fallback_count += 1;
            }
        }
    }

    if aggregation.has_mixed_units() {
        tracing::debug!(
            fallbacks = aggregation.fallback_count,
            "Language weights mix byte counts and occurrence counts"
        );
    }

    aggregation
}

fn lookup_name(repo: &GitHubRepo) -> String {
    if repo.full_name.is_empty() {
        repo.name.clone()
    } else {
        repo.full_name.clone()
    }
}

/// URLs of the `m` most-starred repositories worth showing on a profile.
///
/// Forks and GitHub Pages repositories are left out.
#[must_use]
pub fn top_projects(repos: &[GitHubRepo], m: usize) -> Vec<String> {
    let mut candidates: Vec<&GitHubRepo> = repos
        .iter()
        .filter(|r| !r.fork && !r.is_pages_site())
        .collect();
    candidates.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates
        .into_iter()
        .take(m)
        .map(project_url)
        .filter(|url| !url.is_empty())
        .collect()
}

fn project_url(repo: &GitHubRepo) -> String {
    if !repo.html_url.is_empty() {
        repo.html_url.clone()
    } else if !repo.full_name.is_empty() {
        format!("https://github.com/{}", repo.full_name)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::github::{GitHubError, GitHubUser, LanguageBreakdown};

    fn repo(name: &str, stars: u32, language: Option<&str>, fork: bool) -> GitHubRepo {
        GitHubRepo {
            id: 0,
            name: name.to_string(),
            full_name: format!("dev/{name}"),
            html_url: format!("https://github.com/dev/{name}"),
            description: None,
            stargazers_count: stars,
            language: language.map(String::from),
            fork,
            archived: false,
            private: false,
            created_at: None,
            updated_at: None,
            pushed_at: None,
        }
    }

    /// Serves canned `/languages` results and records lookups in order.
    #[derive(Default)]
    struct FakeLanguages {
        breakdowns: HashMap<String, LanguageBreakdown>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLanguages {
        fn with(mut self, full_name: &str, langs: &[(&str, u64)]) -> Self {
            self.breakdowns.insert(
                full_name.to_string(),
                langs.iter().map(|(l, b)| (l.to_string(), *b)).collect(),
            );
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl GitHubApi for FakeLanguages {
        async fn get_user(&self, _handle: &str) -> Result<GitHubUser, GitHubError> {
            unreachable!("aggregator never fetches users")
        }

        async fn list_user_repos(&self, _handle: &str) -> Result<Vec<GitHubRepo>, GitHubError> {
            unreachable!("aggregator never lists repos")
        }

        async fn repo_languages(&self, full_name: &str) -> Result<LanguageBreakdown, GitHubError> {
            self.calls.lock().expect("calls lock").push(full_name.to_string());
            self.breakdowns
                .get(full_name)
                .cloned()
                .ok_or_else(|| GitHubError::Upstream {
                    status: 500,
                    message: "boom".to_string(),
                })
        }
    }

    #[test]
    fn total_stars_excludes_low_star_forks() {
        let repos = vec![
            repo("a", 10, None, false),
            repo("b", 0, None, false),
            repo("c", 5, None, false),
            repo("fork", 2, None, true),
        ];
        assert_eq!(total_stars(&repos), 15);
    }

    #[test]
    fn forks_above_threshold_are_included() {
        let repos = vec![
            repo("at-threshold", FORK_STAR_THRESHOLD, None, true),
            repo("popular-fork", FORK_STAR_THRESHOLD + 1, None, true),
        ];
        let names: Vec<_> = filter_repos(&repos).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["popular-fork"]);
        assert_eq!(total_stars(&repos), u64::from(FORK_STAR_THRESHOLD + 1));
    }

    #[tokio::test]
    async fn bytes_accumulate_across_repositories() {
        let api = FakeLanguages::default()
            .with("dev/a", &[("Rust", 1000), ("Shell", 50)])
            .with("dev/b", &[("Rust", 500), ("Go", 2000)]);
        let repos = vec![
            repo("a", 1, Some("Rust"), false),
            repo("b", 1, Some("Go"), false),
        ];

        let agg = aggregate(&api, &repos, DEFAULT_LANGUAGE_FETCH_LIMIT).await;

        assert_eq!(agg.weights["Rust"].bytes, 1500);
        assert_eq!(agg.weights["Go"].bytes, 2000);
        assert_eq!(agg.weights["Shell"].bytes, 50);
        assert!(!agg.has_mixed_units());
        assert_eq!(agg.top_languages(2), vec!["Go", "Rust"]);
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_one_occurrence() {
        let api = FakeLanguages::default().with("dev/ok", &[("Rust", 10)]);
        let repos = vec![
            repo("ok", 0, Some("Rust"), false),
            repo("broken", 0, Some("Python"), false),
        ];

        let agg = aggregate(&api, &repos, DEFAULT_LANGUAGE_FETCH_LIMIT).await;

        let python = agg.weights["Python"];
        assert_eq!(python.occurrences, 1);
        assert_eq!(python.bytes, 0);
        assert_eq!(python.unit(), WeightUnit::Occurrences);
        assert_eq!(agg.weights["Rust"].unit(), WeightUnit::Bytes);
        assert_eq!(agg.fallback_count, 1);
        assert!(agg.has_mixed_units());
    }

    #[tokio::test]
    async fn repos_without_language_are_not_looked_up() {
        let api = FakeLanguages::default();
        let repos = vec![repo("docs", 3, None, false)];

        let agg = aggregate(&api, &repos, DEFAULT_LANGUAGE_FETCH_LIMIT).await;

        assert!(api.calls().is_empty());
        assert!(agg.weights.is_empty());
        assert_eq!(agg.total_stars, 3);
    }

    #[tokio::test]
    async fn lookups_are_sequential_and_capped() {
        let api = FakeLanguages::default();
        let repos: Vec<_> = (0..25)
            .map(|i| repo(&format!("r{i:02}"), 0, Some("C"), false))
            .collect();

        let agg = aggregate(&api, &repos, DEFAULT_LANGUAGE_FETCH_LIMIT).await;

        let calls = api.calls();
        assert_eq!(calls.len(), DEFAULT_LANGUAGE_FETCH_LIMIT);
        assert_eq!(calls.first().map(String::as_str), Some("dev/r00"));
        assert_eq!(calls.last().map(String::as_str), Some("dev/r19"));
        assert_eq!(agg.weights["C"].occurrences, DEFAULT_LANGUAGE_FETCH_LIMIT as u64);
    }

    #[tokio::test]
    async fn excluded_forks_are_not_looked_up() {
        let api = FakeLanguages::default();
        let repos = vec![repo("fork", 0, Some("Rust"), true)];

        aggregate(&api, &repos, DEFAULT_LANGUAGE_FETCH_LIMIT).await;

        assert!(api.calls().is_empty());
    }

    #[test]
    fn mixed_weight_reports_mixed_unit() {
        let weight = LanguageWeight {
            bytes: 10,
            occurrences: 1,
        };
        assert_eq!(weight.unit(), WeightUnit::Mixed);
        assert_eq!(weight.ranking_value(), 11);
    }

    #[test]
    fn ranking_ties_break_by_name() {
        let agg = Aggregation::from_bytes(
            HashMap::from([
                ("Zig".to_string(), 5),
                ("Ada".to_string(), 5),
                ("Rust".to_string(), 9),
            ]),
            0,
        );
        assert_eq!(agg.top_languages(15), vec!["Rust", "Ada", "Zig"]);
        assert_eq!(agg.top_languages(1), vec!["Rust"]);
    }

    #[test]
    fn top_projects_skips_forks_and_pages_sites() {
        let repos = vec![
            repo("small", 1, None, false),
            repo("dev.github.io", 100, None, false),
            repo("famous-fork", 500, None, true),
            repo("big", 50, None, false),
            repo("mid", 10, None, false),
        ];

        assert_eq!(
            top_projects(&repos, 2),
            vec![
                "https://github.com/dev/big".to_string(),
                "https://github.com/dev/mid".to_string(),
            ]
        );
    }

    #[test]
    fn top_projects_builds_url_from_full_name_when_missing() {
        let mut r = repo("tool", 1, None, false);
        r.html_url.clear();
        assert_eq!(top_projects(&[r], 8), vec!["https://github.com/dev/tool"]);
    }
}
