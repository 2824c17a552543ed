//! GitTalent CLI - sync developer profiles from GitHub.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::commands::github::OutputFormat;

#[derive(Parser)]
#[command(name = "gittalent")]
#[command(version)]
#[command(about = "Sync developer profiles from GitHub")]
#[command(
    long_about = "GitTalent reads a developer's public GitHub activity, ranks their languages \
and repositories, and merges the results into their stored developer profile. \
Existing profile entries are never removed by a sync."
)]
#[command(after_long_help = r#"EXAMPLES
    Create the database schema:
        $ gittalent migrate up

    Register a developer and link their GitHub account:
        $ gittalent developer add 7c9e6679-7425-40de-944b-e07fc1f90ae7 --handle octocat

    Preview what a sync would find, without writing anything:
        $ gittalent github preview octocat

    Sync one developer, or every linked developer:
        $ gittalent sync 7c9e6679-7425-40de-944b-e07fc1f90ae7
        $ gittalent sync --all

CONFIGURATION
    GitTalent reads configuration from:
      1. ~/.config/gittalent/config.toml (or $XDG_CONFIG_HOME/gittalent/config.toml)
      2. ./gittalent.toml
      3. Environment variables (GITTALENT_* prefix, e.g., GITTALENT_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITTALENT_DATABASE_URL     Database connection string (default: ~/.local/state/gittalent/gittalent.db)
    GITTALENT_GITHUB_TOKEN     GitHub personal access token (falls back to GITHUB_TOKEN)
    GITTALENT_GITHUB_API_BASE  GitHub REST API base URL
    GITTALENT_PROXY_URL        Installation proxy endpoint
    GITTALENT_PROXY_API_KEY    Bearer key for the installation proxy
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage developer profiles
    Developer {
        #[command(subcommand)]
        action: DeveloperAction,
    },
    /// Query GitHub without touching the database
    Github {
        #[command(subcommand)]
        action: GithubAction,
    },
    /// Sync developer profiles from GitHub
    Sync {
        /// User id(s) of the profile owners
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        user_ids: Vec<Uuid>,

        /// Sync every developer with a linked GitHub handle
        #[arg(short, long)]
        all: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[derive(Subcommand)]
enum DeveloperAction {
    /// Create a developer profile
    Add {
        /// User id of the profile owner
        user_id: Uuid,

        /// GitHub handle to link
        #[arg(short = 'H', long)]
        handle: Option<String>,

        /// GitHub App installation id
        #[arg(short, long)]
        installation_id: Option<i64>,
    },
    /// Link a GitHub account to an existing profile
    Link {
        /// User id of the profile owner
        user_id: Uuid,

        /// GitHub handle
        handle: String,

        /// GitHub App installation id
        #[arg(short, long)]
        installation_id: Option<i64>,
    },
    /// Show a developer profile
    Show {
        /// User id of the profile owner
        user_id: Uuid,
    },
}

#[derive(Subcommand)]
enum GithubAction {
    /// Fetch a GitHub profile and show what a sync would merge
    Preview {
        /// GitHub handle
        handle: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    shutdown::setup_shutdown_handler();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("gittalent=info,gittalent_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    // Commands that don't require database access
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Github { action } => {
            commands::github::handle_github(action, &config).await?;
            return Ok(());
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set GITTALENT_DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Developer { action } => {
            commands::developer::handle_developer(action, &database_url).await?;
        }
        Commands::Sync { user_ids, all } => {
            commands::sync::handle_sync(user_ids, all, &config, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Github { .. } => {}
    }

    Ok(())
}
