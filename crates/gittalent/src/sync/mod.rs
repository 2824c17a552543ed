//! Profile sync: state machine, write-back and the service tying them together.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncOptions` and defaults
//! - [`progress`] - `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`state`] - `SyncState` and the failure taxonomy
//! - [`writer`] - merging snapshot data into a stored profile
//! - [`service`] - `GitHubSyncService`
//!
//! ```ignore
//! use gittalent::sync::{GitHubSyncService, SyncOptions};
//!
//! let service = GitHubSyncService::new(github, store, SyncOptions::default());
//! let report = service.sync_profile(user_id).await?;
//! ```

mod progress;
mod service;
mod state;
mod types;
mod writer;

pub use types::{DEFAULT_HTTP_TIMEOUT, DEFAULT_TOP_LANGUAGES, DEFAULT_TOP_PROJECTS, SyncOptions};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use state::{SnapshotResult, SyncErrorKind, SyncFailure, SyncState};

pub use writer::{SkipReason, WriteOutcome, merge_unique, write_back};

pub use service::{GitHubSyncService, SyncReport};
