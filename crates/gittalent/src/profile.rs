//! Developer profile persistence.
//!
//! Free functions operate on a [`DatabaseConnection`](sea_orm::DatabaseConnection)
//! directly; [`ProfileStore`] is the seam the sync writer depends on.

mod errors;
mod single;
mod store;
mod types;

pub use errors::{ProfileError, Result};
pub use single::{find_by_user_id, insert, link_github, list_linked, update_synced_fields};
pub use store::{ProfileStore, SeaOrmProfileStore};
pub use types::DeveloperProfile;

#[cfg(test)]
pub(crate) use store::memory::MemoryProfileStore;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn not_found_error_names_user() {
        let id = Uuid::new_v4();
        let err = ProfileError::not_found_for_user(id);
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains(&id.to_string()));
    }
}
