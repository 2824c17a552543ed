//! Developer entity - the slice of a developer profile that GitHub sync touches.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "developers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Account identifier of the profile owner. One developer row per user.
    #[sea_orm(unique)]
    pub user_id: Uuid,

    // ─── GitHub link ─────────────────────────────────────────────────────────
    /// Linked GitHub login, if any.
    pub github_handle: Option<String>,
    /// GitHub App installation, when the developer installed the app.
    pub github_installation_id: Option<i64>,

    // ─── Synced fields ───────────────────────────────────────────────────────
    /// Language names (JSON array of strings).
    #[sea_orm(column_type = "Json")]
    pub top_languages: serde_json::Value,
    /// Project URLs (JSON array of strings).
    #[sea_orm(column_type = "Json")]
    pub linked_projects: serde_json::Value,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether a GitHub handle is linked.
    pub fn has_github(&self) -> bool {
        self.github_handle
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
    }
}
