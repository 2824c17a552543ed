//! Merge synced GitHub data into a stored developer profile.

use std::collections::HashSet;

use uuid::Uuid;

use super::state::SyncState;
use super::types::SyncOptions;
use crate::profile::ProfileStore;
use crate::snapshot::GitHubProfileSnapshot;

/// Why a write-back did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch is still running; its result may supersede this snapshot.
    FetchInFlight,
    /// No developer profile exists for the user.
    ProfileMissing,
    /// The profile now points at a different handle than the snapshot.
    HandleMismatch {
        profile_handle: Option<String>,
        snapshot_handle: String,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchInFlight => f.write_str("a fetch is still in flight"),
            Self::ProfileMissing => f.write_str("developer profile not found"),
            Self::HandleMismatch {
                profile_handle: Some(current),
                snapshot_handle,
            } => write!(
                f,
                "profile is linked to '{current}', snapshot is for '{snapshot_handle}'"
            ),
            Self::HandleMismatch {
                profile_handle: None,
                snapshot_handle,
            } => write!(f, "profile has no handle, snapshot is for '{snapshot_handle}'"),
        }
    }
}

/// Result of [`write_back`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// One write was issued with these merged lists.
    Written {
        top_languages: Vec<String>,
        linked_projects: Vec<String>,
    },
    Skipped(SkipReason),
    /// The store failed. The message is for logs only.
    Failed(String),
}

impl WriteOutcome {
    #[must_use]
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Union of `existing` and `discovered`.
///
/// Existing entries keep their order, new entries are appended in discovery
/// order, and duplicates are removed. No existing entry is ever dropped.
#[must_use]
pub fn merge_unique(existing: &[String], discovered: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(existing.len() + discovered.len());
    existing
        .iter()
        .chain(discovered)
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Merge the snapshot's top languages and projects into the profile of `user_id`.
///
/// Guards, checked in order: a fetch in flight for the snapshot's own handle,
/// a missing profile, and a profile whose handle no longer matches the snapshot. Failures are logged
/// and reported in the outcome; they never reach the sync state.
pub async fn write_back<S>(
    store: &S,
    user_id: Uuid,
    snapshot: &GitHubProfileSnapshot,
    state: &SyncState,
    options: &SyncOptions,
) -> WriteOutcome
where
    S: ProfileStore + ?Sized,
{
    if state.loading_handle().is_some_and(|h| snapshot.is_for(h)) {
        tracing::debug!(%user_id, handle = %snapshot.handle, "Skipping profile write, fetch in flight");
        return WriteOutcome::Skipped(SkipReason::FetchInFlight);
    }

    let profile = match store.find_developer(user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            tracing::debug!(%user_id, "Skipping profile write, no developer profile");
            return WriteOutcome::Skipped(SkipReason::ProfileMissing);
        }
        Err(e) => {
            tracing::error!(%user_id, error = %e, "Failed to load developer profile");
            return WriteOutcome::Failed(e.to_string());
        }
    };

    if !profile.handle().is_some_and(|h| snapshot.is_for(h)) {
        let reason = SkipReason::HandleMismatch {
            profile_handle: profile.handle().map(String::from),
            snapshot_handle: snapshot.handle.clone(),
        };
        tracing::debug!(%user_id, %reason, "Skipping profile write");
        return WriteOutcome::Skipped(reason);
    }

    let top_languages = merge_unique(
        &profile.top_languages,
        &snapshot.top_languages(options.top_languages),
    );
    let linked_projects = merge_unique(
        &profile.linked_projects,
        &snapshot.top_projects(options.top_projects),
    );

    match store
        .save_synced_fields(user_id, &top_languages, &linked_projects)
        .await
    {
        Ok(()) => {
            tracing::info!(
                %user_id,
                handle = %snapshot.handle,
                languages = top_languages.len(),
                projects = linked_projects.len(),
                "Updated developer profile from GitHub"
            );
            WriteOutcome::Written {
                top_languages,
                linked_projects,
            }
        }
        Err(e) => {
            tracing::error!(%user_id, error = %e, "Failed to save synced profile fields");
            WriteOutcome::Failed(e.to_string())
        }
    }
}
