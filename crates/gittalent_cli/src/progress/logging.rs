use gittalent::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingProfile { handle, via_proxy } => {
                tracing::info!(handle = %handle, via_proxy, "Fetching GitHub profile");
            }

            SyncProgress::CacheHit { handle } => {
                tracing::debug!(handle = %handle, "Cache hit");
            }

            SyncProgress::JoinedInFlight { handle } => {
                tracing::debug!(handle = %handle, "Waiting for in-flight fetch");
            }

            SyncProgress::SnapshotReady {
                handle,
                repos,
                total_stars,
                languages,
                active_days,
            } => {
                tracing::info!(
                    handle = %handle,
                    repos,
                    total_stars,
                    languages,
                    active_days,
                    "Snapshot ready"
                );
            }

            SyncProgress::FetchFailed { handle, message } => {
                tracing::warn!(handle = %handle, error = %message, "Fetch failed");
            }

            SyncProgress::ProfileUpdated {
                user_id,
                languages,
                projects,
            } => {
                tracing::info!(%user_id, languages, projects, "Profile updated");
            }

            SyncProgress::WriteSkipped { user_id, reason } => {
                tracing::info!(%user_id, reason = %reason, "Profile write skipped");
            }

            SyncProgress::WriteFailed { user_id, message } => {
                tracing::error!(%user_id, error = %message, "Profile write failed");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
