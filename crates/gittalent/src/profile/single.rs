use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::errors::{ProfileError, Result};
use super::types::DeveloperProfile;
use crate::entity::developer::{ActiveModel, Column, Entity as Developer};

/// Find the developer profile owned by `user_id`.
pub async fn find_by_user_id(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<DeveloperProfile>> {
    Developer::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?
        .map(DeveloperProfile::try_from)
        .transpose()
}

/// All profiles with a linked GitHub handle, oldest first.
pub async fn list_linked(db: &DatabaseConnection) -> Result<Vec<DeveloperProfile>> {
    Developer::find()
        .filter(Column::GithubHandle.is_not_null())
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .filter(|model| model.has_github())
        .map(DeveloperProfile::try_from)
        .collect()
}

/// Create a developer profile with empty synced fields.
///
/// # Errors
/// Returns `ProfileError::Database` if a profile already exists for `user_id`.
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    github_handle: Option<&str>,
    github_installation_id: Option<i64>,
) -> Result<DeveloperProfile> {
    let now = Utc::now().fixed_offset();
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        github_handle: Set(normalize_handle(github_handle)),
        github_installation_id: Set(github_installation_id),
        top_languages: Set(serde_json::json!([])),
        linked_projects: Set(serde_json::json!([])),
        created_at: Set(now),
        updated_at: Set(now),
    };
    DeveloperProfile::try_from(model.insert(db).await?)
}

/// Set the GitHub handle and installation for an existing profile.
pub async fn link_github(
    db: &DatabaseConnection,
    user_id: Uuid,
    github_handle: &str,
    github_installation_id: Option<i64>,
) -> Result<DeveloperProfile> {
    let handle = normalize_handle(Some(github_handle))
        .ok_or_else(|| ProfileError::invalid_data("empty GitHub handle"))?;

    let result = Developer::update_many()
        .col_expr(Column::GithubHandle, Expr::value(handle))
        .col_expr(
            Column::GithubInstallationId,
            Expr::value(github_installation_id),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ProfileError::not_found_for_user(user_id));
    }

    find_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| ProfileError::not_found_for_user(user_id))
}

/// Overwrite the synced language and project lists in one UPDATE.
///
/// No read-modify-write check is made: a concurrent edit between the
/// caller's read and this write is overwritten.
pub async fn update_synced_fields(
    db: &DatabaseConnection,
    user_id: Uuid,
    top_languages: &[String],
    linked_projects: &[String],
) -> Result<()> {
    let result = Developer::update_many()
        .col_expr(
            Column::TopLanguages,
            Expr::value(serde_json::json!(top_languages)),
        )
        .col_expr(
            Column::LinkedProjects,
            Expr::value(serde_json::json!(linked_projects)),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ProfileError::not_found_for_user(user_id));
    }
    Ok(())
}

fn normalize_handle(handle: Option<&str>) -> Option<String> {
    handle
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
}
