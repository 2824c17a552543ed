//! Progress reporting for profile syncs.

use uuid::Uuid;

use super::writer::SkipReason;

/// Progress events emitted by [`GitHubSyncService`](super::GitHubSyncService).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting a network fetch for a handle.
    FetchingProfile {
        handle: String,
        /// Whether the installation proxy is used instead of the REST API.
        via_proxy: bool,
    },

    /// Answered from the snapshot cache.
    CacheHit { handle: String },

    /// Another request for the same handle is running; waiting for it.
    JoinedInFlight { handle: String },

    /// A snapshot was built.
    SnapshotReady {
        handle: String,
        repos: usize,
        total_stars: u64,
        languages: usize,
        active_days: usize,
    },

    /// The fetch failed.
    FetchFailed { handle: String, message: String },

    /// Synced fields were written to the profile.
    ProfileUpdated {
        user_id: Uuid,
        languages: usize,
        projects: usize,
    },

    /// The write-back was skipped.
    WriteSkipped { user_id: Uuid, reason: SkipReason },

    /// The write-back failed. The snapshot itself is still valid.
    WriteFailed { user_id: Uuid, message: String },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
