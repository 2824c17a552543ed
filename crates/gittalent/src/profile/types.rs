use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use super::errors::{ProfileError, Result};
use crate::entity::developer::Model;

/// A developer profile as the sync subsystem sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub github_handle: Option<String>,
    pub github_installation_id: Option<i64>,
    pub top_languages: Vec<String>,
    pub linked_projects: Vec<String>,
    pub updated_at: DateTime<FixedOffset>,
}

impl DeveloperProfile {
    /// The linked handle, trimmed, if one is set.
    pub fn handle(&self) -> Option<&str> {
        self.github_handle
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

impl TryFrom<Model> for DeveloperProfile {
    type Error = ProfileError;

    fn try_from(model: Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            github_handle: model.github_handle,
            github_installation_id: model.github_installation_id,
            top_languages: string_list("top_languages", model.top_languages)?,
            linked_projects: string_list("linked_projects", model.linked_projects)?,
            updated_at: model.updated_at,
        })
    }
}

/// Decode a JSON column holding an array of strings. `null` reads as empty.
pub(crate) fn string_list(column: &str, value: serde_json::Value) -> Result<Vec<String>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
        .map_err(|e| ProfileError::invalid_data(format!("{column} is not a string array: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn model(top_languages: serde_json::Value) -> Model {
        Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            github_handle: Some(" octocat ".to_string()),
            github_installation_id: Some(7),
            top_languages,
            linked_projects: serde_json::Value::Null,
            created_at: Utc::now().fixed_offset(),
            updated_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn decodes_json_columns() {
        let profile = DeveloperProfile::try_from(model(serde_json::json!(["Go", "Rust"])))
            .expect("valid model");
        assert_eq!(profile.top_languages, vec!["Go", "Rust"]);
        assert!(profile.linked_projects.is_empty());
        assert_eq!(profile.handle(), Some("octocat"));
    }

    #[test]
    fn rejects_non_string_arrays() {
        let err = DeveloperProfile::try_from(model(serde_json::json!({ "Go": 1 })))
            .expect_err("object is not a list");
        assert!(matches!(err, ProfileError::InvalidData { .. }));
        assert!(err.to_string().contains("top_languages"));
    }
}
