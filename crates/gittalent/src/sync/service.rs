//! The sync service: one object owning fetch, cache, dedup and write-back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::state::{SnapshotResult, SyncErrorKind, SyncFailure, SyncState};
use super::types::SyncOptions;
use super::writer::{WriteOutcome, write_back};
use crate::github::{GitHubApi, GitHubError, InstallationProxyClient};
use crate::profile::{ProfileError, ProfileStore};
use crate::snapshot::{GitHubProfileSnapshot, fetch_snapshot};

/// Outcome of [`GitHubSyncService::sync_profile`].
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub user_id: Uuid,
    pub handle: String,
    pub snapshot: SnapshotResult,
    /// `None` when the fetch failed and no write was attempted.
    pub write: Option<WriteOutcome>,
}

type ResultReceiver = watch::Receiver<Option<SnapshotResult>>;
type ResultSender = watch::Sender<Option<SnapshotResult>>;

#[derive(Default)]
struct Registry {
    cache: HashMap<String, Arc<GitHubProfileSnapshot>>,
    in_flight: HashMap<String, ResultReceiver>,
}

enum Lookup {
    Cached(Arc<GitHubProfileSnapshot>),
    Join(ResultReceiver),
    Lead(ResultSender),
}

/// Removes the in-flight entry if the leading request is dropped mid-fetch.
struct InFlightGuard<'a> {
    registry: &'a Mutex<Registry>,
    key: &'a str,
    armed: bool,
}

impl InFlightGuard<'_> {
    /// Publish the result to the cache and retire the in-flight entry together.
    fn complete(mut self, result: &SnapshotResult) {
        let mut registry = lock(self.registry);
        if let Ok(snapshot) = result {
            registry
                .cache
                .insert(self.key.to_string(), Arc::clone(snapshot));
        }
        registry.in_flight.remove(self.key);
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.registry).in_flight.remove(self.key);
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cache_key(handle: &str) -> String {
    handle.trim().to_ascii_lowercase()
}

/// Fetches GitHub profiles and merges them into developer profiles.
///
/// State is published on a `watch` channel. Snapshots are cached per handle
/// until [`invalidate`](Self::invalidate) is called, and concurrent requests
/// for the same handle share one set of network round-trips.
pub struct GitHubSyncService {
    github: Arc<dyn GitHubApi>,
    proxy: Option<InstallationProxyClient>,
    store: Arc<dyn ProfileStore>,
    options: SyncOptions,
    state: watch::Sender<SyncState>,
    registry: Mutex<Registry>,
    on_progress: Option<ProgressCallback>,
}

impl GitHubSyncService {
    pub fn new(
        github: Arc<dyn GitHubApi>,
        store: Arc<dyn ProfileStore>,
        options: SyncOptions,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            github,
            proxy: None,
            store,
            options,
            state,
            registry: Mutex::new(Registry::default()),
            on_progress: None,
        }
    }

    /// Route handles with an installation id through the installation proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: InstallationProxyClient) -> Self {
        self.proxy = Some(proxy);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Cached snapshot for `handle`, if one exists.
    pub fn cached(&self, handle: &str) -> Option<Arc<GitHubProfileSnapshot>> {
        lock(&self.registry).cache.get(&cache_key(handle)).cloned()
    }

    /// Drop the cached snapshot for `handle` so the next sync refetches.
    ///
    /// A settled state for that handle returns to `Idle`.
    pub fn invalidate(&self, handle: &str) {
        let removed = lock(&self.registry).cache.remove(&cache_key(handle)).is_some();
        self.state.send_if_modified(|state| state.reset_if_for(handle));
        tracing::debug!(handle = %handle.trim(), removed, "Invalidated snapshot cache");
    }

    /// Produce a snapshot for `handle`.
    ///
    /// Answers from the cache when possible. While a request for the same
    /// handle is running, later callers wait for its result instead of
    /// issuing their own. Failures are returned as-is; nothing is retried.
    pub async fn sync_handle(&self, handle: &str, installation_id: Option<i64>) -> SnapshotResult {
        let handle = handle.trim();
        self.state.send_modify(|state| state.begin(handle));

        if handle.is_empty() {
            let failure = SyncFailure::from_github(handle, &GitHubError::InvalidHandle);
            self.finish(handle, Err(failure.clone()));
            return Err(failure);
        }

        let key = cache_key(handle);
        let result = match self.lookup(&key) {
            Lookup::Cached(snapshot) => {
                tracing::debug!(handle = %handle, "Serving cached snapshot");
                emit(
                    self.on_progress.as_ref(),
                    SyncProgress::CacheHit {
                        handle: handle.to_string(),
                    },
                );
                Ok(snapshot)
            }
            Lookup::Join(receiver) => {
                tracing::debug!(handle = %handle, "Joining in-flight fetch");
                emit(
                    self.on_progress.as_ref(),
                    SyncProgress::JoinedInFlight {
                        handle: handle.to_string(),
                    },
                );
                wait_for_leader(receiver, handle).await
            }
            Lookup::Lead(sender) => {
                let guard = InFlightGuard {
                    registry: &self.registry,
                    key: &key,
                    armed: true,
                };
                let result = self.fetch(handle, installation_id).await;
                guard.complete(&result);
                sender.send_replace(Some(result.clone()));
                result
            }
        };

        self.finish(handle, result.clone());
        result
    }

    /// Sync the developer owned by `user_id` and merge the result into their profile.
    ///
    /// Errors are returned only when the profile cannot be loaded or has no
    /// handle. Fetch failures and write outcomes are carried in the report.
    pub async fn sync_profile(&self, user_id: Uuid) -> Result<SyncReport, SyncFailure> {
        let profile = match self.store.find_developer(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                return Err(SyncFailure::from_profile(
                    "",
                    &ProfileError::not_found_for_user(user_id),
                ));
            }
            Err(e) => return Err(SyncFailure::from_profile("", &e)),
        };

        let Some(handle) = profile.handle().map(String::from) else {
            return Err(SyncFailure::new(
                "",
                SyncErrorKind::NotFound,
                "No GitHub account is linked to this profile",
            ));
        };

        let snapshot = self
            .sync_handle(&handle, profile.github_installation_id)
            .await;

        let write = match &snapshot {
            Ok(snapshot) => {
                let state = self.state();
                let outcome =
                    write_back(self.store.as_ref(), user_id, snapshot, &state, &self.options).await;
                self.report_write(user_id, &outcome);
                Some(outcome)
            }
            Err(_) => None,
        };

        Ok(SyncReport {
            user_id,
            handle,
            snapshot,
            write,
        })
    }

    fn lookup(&self, key: &str) -> Lookup {
        let mut registry = lock(&self.registry);
        if let Some(snapshot) = registry.cache.get(key) {
            return Lookup::Cached(Arc::clone(snapshot));
        }
        if let Some(receiver) = registry.in_flight.get(key) {
            return Lookup::Join(receiver.clone());
        }
        let (sender, receiver) = watch::channel(None);
        registry.in_flight.insert(key.to_string(), receiver);
        Lookup::Lead(sender)
    }

    async fn fetch(&self, handle: &str, installation_id: Option<i64>) -> SnapshotResult {
        let today = Utc::now().date_naive();
        let proxy = self.proxy.as_ref().zip(installation_id);

        emit(
            self.on_progress.as_ref(),
            SyncProgress::FetchingProfile {
                handle: handle.to_string(),
                via_proxy: proxy.is_some(),
            },
        );

        let fetched = match proxy {
            Some((proxy, installation_id)) => {
                proxy
                    .fetch_snapshot(handle, installation_id, today)
                    .await
            }
            None => fetch_snapshot(self.github.as_ref(), handle, &self.options, today).await,
        };

        match fetched {
            Ok(snapshot) => {
                tracing::info!(
                    handle = %handle,
                    repos = snapshot.repos.len(),
                    total_stars = snapshot.total_stars,
                    mixed_units = snapshot.languages.has_mixed_units(),
                    "Fetched GitHub profile"
                );
                emit(
                    self.on_progress.as_ref(),
                    SyncProgress::SnapshotReady {
                        handle: handle.to_string(),
                        repos: snapshot.repos.len(),
                        total_stars: snapshot.total_stars,
                        languages: snapshot.languages.weights.len(),
                        active_days: snapshot.active_days(),
                    },
                );
                Ok(Arc::new(snapshot))
            }
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "GitHub profile fetch failed");
                let failure = SyncFailure::from_github(handle, &e);
                emit(
                    self.on_progress.as_ref(),
                    SyncProgress::FetchFailed {
                        handle: handle.to_string(),
                        message: failure.message.clone(),
                    },
                );
                Err(failure)
            }
        }
    }

    fn finish(&self, handle: &str, result: SnapshotResult) {
        let applied = self
            .state
            .send_if_modified(|state| state.complete(handle, result));
        if !applied {
            tracing::debug!(handle = %handle, "Dropping result for superseded request");
        }
    }

    fn report_write(&self, user_id: Uuid, outcome: &WriteOutcome) {
        let event = match outcome {
            WriteOutcome::Written {
                top_languages,
                linked_projects,
            } => SyncProgress::ProfileUpdated {
                user_id,
                languages: top_languages.len(),
                projects: linked_projects.len(),
            },
            WriteOutcome::Skipped(reason) => SyncProgress::WriteSkipped {
                user_id,
                reason: reason.clone(),
            },
            WriteOutcome::Failed(message) => SyncProgress::WriteFailed {
                user_id,
                message: message.clone(),
            },
        };
        emit(self.on_progress.as_ref(), event);
    }
}

async fn wait_for_leader(mut receiver: ResultReceiver, handle: &str) -> SnapshotResult {
    let abandoned = || {
        SyncFailure::new(
            handle,
            SyncErrorKind::Network,
            "The GitHub request this sync was waiting on was abandoned",
        )
    };
    match receiver.wait_for(Option::is_some).await {
        Ok(value) => value.clone().unwrap_or_else(|| Err(abandoned())),
        Err(_) => Err(abandoned()),
    }
}
