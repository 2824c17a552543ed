//! GitTalent - GitHub profile sync for developer profiles.
//!
//! Fetches a developer's public GitHub activity, aggregates languages and
//! stars, synthesizes a display-only contribution calendar, and merges the
//! discovered languages and projects into the stored developer profile.
//!
//! # Features
//!
//! - `sqlite` / `postgres` - database backends for the profile store
//! - `migrate` - enables [`connect_and_migrate`] and the [`migration`] module
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gittalent::github::{GitHubClient, DEFAULT_TIMEOUT};
//! use gittalent::profile::SeaOrmProfileStore;
//! use gittalent::sync::{GitHubSyncService, SyncOptions};
//!
//! let db = gittalent::connect_and_migrate("sqlite://gittalent.db?mode=rwc").await?;
//! let github = GitHubClient::new(token.as_deref(), DEFAULT_TIMEOUT)?;
//! let service = GitHubSyncService::new(
//!     Arc::new(github),
//!     Arc::new(SeaOrmProfileStore::new(db)),
//!     SyncOptions::default(),
//! );
//! let report = service.sync_profile(user_id).await?;
//! ```

pub mod aggregate;
pub mod contributions;
pub mod db;
pub mod entity;
pub mod github;
pub mod http;
pub mod profile;
pub mod snapshot;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use github::GitHubError;
pub use profile::{DeveloperProfile, ProfileError};
pub use snapshot::GitHubProfileSnapshot;
pub use sync::{GitHubSyncService, SyncState};
