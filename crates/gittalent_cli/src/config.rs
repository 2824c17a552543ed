//! Configuration file support for gittalent.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GITTALENT_`, e.g., `GITTALENT_DATABASE_URL`)
//! 3. Config file (~/.config/gittalent/config.toml or ./gittalent.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/gittalent/gittalent.db` on Linux
//! if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "postgres://localhost/gittalent"
//!
//! [github]
//! token = "ghp_..."  # or GITTALENT_GITHUB_TOKEN / GITHUB_TOKEN
//! api_base = "https://api.github.com"
//!
//! [proxy]
//! url = "https://talent.example.com/functions/v1/github-proxy"
//! api_key = "..."
//!
//! [sync]
//! top_languages = 15
//! top_projects = 8
//! language_fetch_limit = 20
//! http_timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigBuilder as Builder, Environment, File, FileFormat};
use config::builder::DefaultState;
use directories::ProjectDirs;
use gittalent::sync::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_TOP_LANGUAGES, DEFAULT_TOP_PROJECTS, SyncOptions,
};
use serde::Deserialize;

const APP_NAME: &str = "gittalent";

/// Keys whose names contain an underscore. The `_` env separator cannot
/// address them, so they are read from their full variable names.
const UNDERSCORED_KEYS: &[(&str, &str)] = &[
    ("GITTALENT_GITHUB_API_BASE", "github.api_base"),
    ("GITTALENT_PROXY_API_KEY", "proxy.api_key"),
    ("GITTALENT_SYNC_TOP_LANGUAGES", "sync.top_languages"),
    ("GITTALENT_SYNC_TOP_PROJECTS", "sync.top_projects"),
    ("GITTALENT_SYNC_LANGUAGE_FETCH_LIMIT", "sync.language_fetch_limit"),
    ("GITTALENT_SYNC_HTTP_TIMEOUT_SECS", "sync.http_timeout_secs"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    /// Installation proxy. Used for developers linked through the GitHub App.
    pub proxy: ProxyConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. Unauthenticated requests are allowed but heavily rate limited.
    pub token: Option<String>,
    /// Override for the REST API base, e.g. for GitHub Enterprise.
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Endpoint that fetches profiles with installation credentials.
    pub url: Option<String>,
    /// Bearer key sent to the proxy.
    pub api_key: Option<String>,
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Languages merged into a profile per sync.
    pub top_languages: usize,
    /// Project links merged into a profile per sync.
    pub top_projects: usize,
    /// Maximum repositories whose language breakdown is fetched.
    pub language_fetch_limit: usize,
    /// Timeout for each HTTP request.
    pub http_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let options = SyncOptions::default();
        Self {
            top_languages: DEFAULT_TOP_LANGUAGES,
            top_projects: DEFAULT_TOP_PROJECTS,
            language_fetch_limit: options.language_fetch_limit,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gittalent/config.toml)
    /// 3. Local config file (./gittalent.toml)
    /// 4. Environment variables with GITTALENT_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("gittalent.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gittalent.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GITTALENT_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("GITTALENT")
                .separator("_")
                .try_parsing(true),
        );

        let built = apply_underscored_env(builder, |name| std::env::var(name).ok())
            .and_then(|builder| builder.build());

        match built {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// `mode=rwc` opens the SQLite file read-write and creates it if missing.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("gittalent.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// GitHub token from config, falling back to the conventional `GITHUB_TOKEN`.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.http_timeout_secs.max(1))
    }

    pub fn to_sync_options(&self) -> SyncOptions {
        SyncOptions {
            top_languages: self.sync.top_languages,
            top_projects: self.sync.top_projects,
            language_fetch_limit: self.sync.language_fetch_limit,
        }
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/gittalent` or `~/.local/state/gittalent`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

fn apply_underscored_env(
    mut builder: Builder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Builder<DefaultState>, config::ConfigError> {
    for (var, key) in UNDERSCORED_KEYS {
        builder = builder.set_override_option(*key, lookup(var))?;
    }
    Ok(builder)
}
