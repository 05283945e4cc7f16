//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file record. The bytes live in the blob store under `blob_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file owner.
    pub owner_id: Uuid,
    /// Containing folder (`None` for the owner's root).
    pub folder_id: Option<Uuid>,
    /// Display name including extension.
    pub name: String,
    /// Size in bytes as measured at upload.
    pub size_bytes: i64,
    /// MIME type label.
    pub content_type: String,
    /// Handle into the blob store.
    #[serde(skip_serializing)]
    pub blob_id: Uuid,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

impl File {
    /// Lowercase extension with its leading dot, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// Lowercase extension of a file name with its leading dot.
///
/// `"archive.TAR.gz"` yields `".gz"`; names without a dot, or with only a
/// leading dot (`".bashrc"`), yield `None`.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Pre-allocated file id.
    pub id: Uuid,
    /// The file owner.
    pub owner_id: Uuid,
    /// Target folder (`None` for root).
    pub folder_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Bytes written to the blob store.
    pub size_bytes: i64,
    /// MIME type label.
    pub content_type: String,
    /// Blob handle.
    pub blob_id: Uuid,
}
