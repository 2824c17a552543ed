use chrono::Utc;
use clap::ValueEnum;
use gittalent::GitHubProfileSnapshot;
use gittalent::aggregate::WeightUnit;
use gittalent::snapshot::fetch_snapshot;
use gittalent::sync::{SyncFailure, SyncOptions};
use serde::Serialize;
use tabled::Tabled;

use crate::GithubAction;
use crate::commands::shared::github_client;
use crate::config::Config;

/// Output format for previews.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

#[derive(Debug, Serialize, Tabled)]
struct LanguageRow {
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Weight")]
    weight: u64,
    #[tabled(rename = "Unit")]
    #[tabled(display_with = "unit_label")]
    unit: WeightUnit,
}

fn unit_label(unit: &WeightUnit) -> String {
    match unit {
        WeightUnit::Bytes => "bytes",
        WeightUnit::Occurrences => "repos",
        WeightUnit::Mixed => "mixed",
    }
    .to_string()
}

#[derive(Debug, Serialize)]
struct Preview {
    handle: String,
    name: Option<String>,
    repos: usize,
    total_stars: u64,
    active_days: usize,
    mixed_units: bool,
    languages: Vec<LanguageRow>,
    projects: Vec<String>,
}

impl Preview {
    fn from_snapshot(snapshot: &GitHubProfileSnapshot, options: &SyncOptions) -> Self {
        let languages = snapshot
            .languages
            .ranked()
            .into_iter()
            .take(options.top_languages)
            .map(|(name, weight)| LanguageRow {
                language: name.to_string(),
                weight: weight.ranking_value(),
                unit: weight.unit(),
            })
            .collect();
        Self {
            handle: snapshot.user.login.clone(),
            name: snapshot.user.name.clone(),
            repos: snapshot.repos.len(),
            total_stars: snapshot.total_stars,
            active_days: snapshot.active_days(),
            mixed_units: snapshot.languages.has_mixed_units(),
            languages,
            projects: snapshot.top_projects(options.top_projects),
        }
    }

    fn print(&self, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
        match format {
            OutputFormat::Table => {
                match &self.name {
                    Some(name) => println!("{} ({})", self.handle, name),
                    None => println!("{}", self.handle),
                }
                println!(
                    "{} public repos, {} stars, {} active days",
                    self.repos, self.total_stars, self.active_days
                );
                if self.mixed_units {
                    println!("Some language lookups failed; those repos count by primary language.");
                }
                println!();

                let mut table = tabled::Table::new(&self.languages);
                table.with(tabled::settings::Style::rounded());
                println!("{table}");

                println!();
                println!("Projects:");
                for url in &self.projects {
                    println!("  {url}");
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?);
            }
        }
        Ok(())
    }
}

pub(crate) async fn handle_github(
    action: &GithubAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GithubAction::Preview { handle, output } => {
            let client = github_client(config)?;
            let options = config.to_sync_options();
            let today = Utc::now().date_naive();

            let snapshot = fetch_snapshot(&client, handle, &options, today)
                .await
                .map_err(|e| SyncFailure::from_github(handle.trim(), &e))?;

            if let Some(limit) = client.last_rate_limit() {
                tracing::debug!(
                    remaining = limit.remaining,
                    limit = limit.limit,
                    reset_at = %limit.reset_at,
                    "GitHub rate limit"
                );
            }

            Preview::from_snapshot(&snapshot, &options).print(*output)?;
        }
    }
    Ok(())
}
