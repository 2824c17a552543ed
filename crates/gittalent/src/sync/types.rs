//! Sync options and constants.

use std::time::Duration;

use crate::aggregate::DEFAULT_LANGUAGE_FETCH_LIMIT;

/// Languages written back to a profile by default.
pub const DEFAULT_TOP_LANGUAGES: usize = 15;

/// Projects written back to a profile by default.
pub const DEFAULT_TOP_PROJECTS: usize = 8;

/// Default HTTP timeout for GitHub and proxy requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for a profile sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum languages merged into the profile.
    pub top_languages: usize,
    /// Maximum project URLs merged into the profile.
    pub top_projects: usize,
    /// Filtered repositories whose language breakdown is fetched.
    pub language_fetch_limit: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            top_languages: DEFAULT_TOP_LANGUAGES,
            top_projects: DEFAULT_TOP_PROJECTS,
            language_fetch_limit: DEFAULT_LANGUAGE_FETCH_LIMIT,
        }
    }
}
