use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the developer profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// No developer row matched.
    #[error("Developer not found: {context}")]
    NotFound { context: String },

    /// A stored column does not have the expected shape.
    #[error("Invalid profile data: {message}")]
    InvalidData { message: String },
}

impl ProfileError {
    /// Create a NotFound error for a user id lookup.
    pub fn not_found_for_user(user_id: Uuid) -> Self {
        Self::NotFound {
            context: format!("user_id={user_id}"),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

/// Result type alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
