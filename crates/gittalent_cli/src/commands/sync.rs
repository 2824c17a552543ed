use std::sync::Arc;

use gittalent::db;
use gittalent::profile::{self, SeaOrmProfileStore};
use gittalent::sync::{GitHubSyncService, SyncReport, WriteOutcome};
use tabled::Tabled;
use uuid::Uuid;

use crate::commands::shared::{github_client, join_or_dash, proxy_client};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::is_shutdown_requested;

#[derive(Debug, Tabled)]
struct ReportRow {
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "GitHub")]
    handle: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Languages")]
    languages: String,
}

impl ReportRow {
    fn from_report(report: &SyncReport) -> Self {
        let (result, languages) = match (&report.snapshot, &report.write) {
            (Err(failure), _) => (format!("failed: {failure}"), "-".to_string()),
            (Ok(_), Some(WriteOutcome::Written { top_languages, .. })) => {
                ("updated".to_string(), join_or_dash(top_languages))
            }
            (Ok(_), Some(WriteOutcome::Skipped(reason))) => {
                (format!("skipped: {reason}"), "-".to_string())
            }
            (Ok(_), Some(WriteOutcome::Failed(message))) => {
                (format!("not saved: {message}"), "-".to_string())
            }
            (Ok(_), None) => ("fetched".to_string(), "-".to_string()),
        };
        Self {
            user_id: report.user_id.to_string(),
            handle: report.handle.clone(),
            result,
            languages,
        }
    }

    fn failed(user_id: Uuid, message: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            handle: "-".to_string(),
            result: format!("failed: {message}"),
            languages: "-".to_string(),
        }
    }
}

pub(crate) async fn handle_sync(
    user_ids: Vec<Uuid>,
    all: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    let user_ids = if all {
        profile::list_linked(&db)
            .await?
            .into_iter()
            .map(|p| p.user_id)
            .collect()
    } else {
        user_ids
    };

    if user_ids.is_empty() {
        println!("No developer profiles to sync.");
        return Ok(());
    }

    let reporter = Arc::new(ProgressReporter::new());
    let mut service = GitHubSyncService::new(
        Arc::new(github_client(config)?),
        Arc::new(SeaOrmProfileStore::new(db)),
        config.to_sync_options(),
    )
    .with_progress(reporter.as_callback());
    if let Some(proxy) = proxy_client(config)? {
        tracing::debug!(url = %proxy.url(), "Using installation proxy");
        service = service.with_proxy(proxy);
    }

    let mut rows = Vec::with_capacity(user_ids.len());
    let mut failures = 0usize;
    for user_id in user_ids {
        if is_shutdown_requested() {
            tracing::warn!("Stopping before remaining profiles");
            break;
        }

        match service.sync_profile(user_id).await {
            Ok(report) => {
                let written = report.write.as_ref().is_some_and(WriteOutcome::is_written);
                if !written {
                    failures += 1;
                }
                rows.push(ReportRow::from_report(&report));
            }
            Err(failure) => {
                failures += 1;
                rows.push(ReportRow::failed(user_id, &failure.message));
            }
        }
    }

    let mut table = tabled::Table::new(&rows);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");

    if failures > 0 {
        return Err(format!("{failures} of {} profile(s) were not updated", rows.len()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use gittalent::GitHubProfileSnapshot;
    use gittalent::github::GitHubUser;
    use gittalent::sync::{SkipReason, SnapshotResult, SyncErrorKind, SyncFailure};

    use super::*;

    fn fetched() -> SnapshotResult {
        let user: GitHubUser =
            serde_json::from_value(serde_json::json!({ "login": "octocat" })).expect("user");
        Ok(Arc::new(GitHubProfileSnapshot {
            handle: "octocat".to_string(),
            user,
            repos: Vec::new(),
            languages: Default::default(),
            total_stars: 0,
            contributions: Vec::new(),
            fetched_at: Utc::now(),
        }))
    }

    fn report(snapshot: SnapshotResult, write: Option<WriteOutcome>) -> SyncReport {
        SyncReport {
            user_id: Uuid::nil(),
            handle: "octocat".to_string(),
            snapshot,
            write,
        }
    }

    #[test]
    fn failed_fetch_row_shows_message() {
        let failure = SyncFailure::new(
            "octocat",
            SyncErrorKind::RateLimited,
            "GitHub rate limit reached. Try again later",
        );
        let row = ReportRow::from_report(&report(Err(failure), None));
        assert!(row.result.starts_with("failed:"));
        assert!(row.result.contains("rate limit"));
        assert_eq!(row.languages, "-");
    }

    #[test]
    fn skipped_write_row_shows_reason() {
        let skipped = report(
            fetched(),
            Some(WriteOutcome::Skipped(SkipReason::ProfileMissing)),
        );
        let row = ReportRow::from_report(&skipped);
        assert_eq!(row.result, "skipped: developer profile not found");
    }

    #[test]
    fn written_row_lists_languages() {
        let written = report(
            fetched(),
            Some(WriteOutcome::Written {
                top_languages: vec!["Rust".to_string(), "Go".to_string()],
                linked_projects: Vec::new(),
            }),
        );
        let row = ReportRow::from_report(&written);
        assert_eq!(row.result, "updated");
        assert_eq!(row.languages, "Rust, Go");
    }
}
