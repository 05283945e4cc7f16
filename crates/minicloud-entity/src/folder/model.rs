//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use minicloud_core::{AppError, AppResult};

/// Longest accepted folder name, in characters.
pub const MAX_FOLDER_NAME_LEN: usize = 255;

/// A folder in an owner's hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder ID (`None` for root folders).
    pub parent_id: Option<Uuid>,
    /// Folder name, unique among its siblings.
    pub name: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Trim and check a proposed folder name.
    pub fn normalize_name(name: &str) -> AppResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("Folder name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_FOLDER_NAME_LEN {
            return Err(AppError::invalid_input(format!(
                "Folder name cannot exceed {MAX_FOLDER_NAME_LEN} characters"
            )));
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(AppError::invalid_input(
                "Folder name cannot contain path separators",
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder (`None` for root).
    pub parent_id: Option<Uuid>,
    /// Normalized folder name.
    pub name: String,
}
