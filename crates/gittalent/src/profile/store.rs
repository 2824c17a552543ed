use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::errors::Result;
use super::single;
use super::types::DeveloperProfile;

/// Storage used by the sync writer.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_developer(&self, user_id: Uuid) -> Result<Option<DeveloperProfile>>;

    /// Overwrite the synced lists with a single write.
    async fn save_synced_fields(
        &self,
        user_id: Uuid,
        top_languages: &[String],
        linked_projects: &[String],
    ) -> Result<()>;
}

/// [`ProfileStore`] backed by the `developers` table.
///
/// Clones share one connection.
#[derive(Debug, Clone)]
pub struct SeaOrmProfileStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ProfileStore for SeaOrmProfileStore {
    async fn find_developer(&self, user_id: Uuid) -> Result<Option<DeveloperProfile>> {
        single::find_by_user_id(&self.db, user_id).await
    }

    async fn save_synced_fields(
        &self,
        user_id: Uuid,
        top_languages: &[String],
        linked_projects: &[String],
    ) -> Result<()> {
        single::update_synced_fields(&self.db, user_id, top_languages, linked_projects).await
    }
}


#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use super::*;
    use crate::connect_and_migrate;

    #[tokio::test]
    async fn sea_orm_store_round_trips_synced_fields() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");
        let user_id = Uuid::new_v4();
        single::insert(&db, user_id, Some("octocat"), None)
            .await
            .expect("insert");

        let store = SeaOrmProfileStore::new(db);
        store
            .save_synced_fields(user_id, &["Rust".to_string()], &[])
            .await
            .expect("save");

        let profile = store
            .find_developer(user_id)
            .await
            .expect("query")
            .expect("profile exists");
        assert_eq!(profile.top_languages, vec!["Rust"]);
    }

    #[tokio::test]
    async fn clones_read_through_the_same_connection() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");
        let store = SeaOrmProfileStore::new(db);
        let clone = store.clone();
        assert!(std::ptr::eq(store.connection(), clone.connection()));

        let user_id = Uuid::new_v4();
        single::insert(clone.connection(), user_id, Some("octocat"), None)
            .await
            .expect("insert");
        assert!(store.find_developer(user_id).await.expect("query").is_some());
    }
}
