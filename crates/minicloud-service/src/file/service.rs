//! File listing, placement, moves, and deletes.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use minicloud_auth::AccessEvaluator;
use minicloud_core::error::AppError;
use minicloud_core::traits::storage::BlobStore;
use minicloud_database::{FileStore, FolderStore};
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::file::File;

use crate::audit::SecurityAudit;
use crate::context::RequestContext;

/// Manages the caller's file records and their blobs.
#[derive(Debug, Clone)]
pub struct FileService {
    files: Arc<dyn FileStore>,
    folders: Arc<dyn FolderStore>,
    blobs: Arc<dyn BlobStore>,
    access: AccessEvaluator,
    audit: SecurityAudit,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
        audit: SecurityAudit,
    ) -> Self {
        Self {
            files,
            folders,
            blobs,
            access: AccessEvaluator::new(),
            audit,
        }
    }

    /// Gets one of the caller's files.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> Result<File, AppError> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.access
            .check_ownership(&ctx.actor(), file.owner_id, "File")?;
        Ok(file)
    }

    /// Files directly in `folder_id` (`None` for root level).
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<File>, AppError> {
        let folder_id = self.place_file(ctx, folder_id).await?;
        self.files.list_in_folder(ctx.user_id, folder_id).await
    }

    /// Resolves where a file may be placed: root level, or a folder the
    /// caller owns. Anything else is `NotFound`.
    pub async fn place_file(
        &self,
        ctx: &RequestContext,
        folder_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError> {
        let Some(id) = folder_id else {
            return Ok(None);
        };
        let folder = self
            .folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        self.access
            .check_ownership(&ctx.actor(), folder.owner_id, "Folder")?;
        Ok(Some(folder.id))
    }

    /// Moves a file to `folder_id` (`None` for root level).
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<File, AppError> {
        let file = self.files.move_to(ctx.user_id, file_id, folder_id).await?;
        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            folder_id = ?folder_id,
            "File moved"
        );
        Ok(file)
    }

    /// Deletes the record, debiting its recorded size, then the blob.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> Result<File, AppError> {
        let file = self.files.delete(ctx.user_id, file_id).await?;

        if let Err(e) = self.blobs.delete(file.owner_id, file.blob_id).await {
            warn!(
                file_id = %file.id,
                blob_id = %file.blob_id,
                error = %e,
                "Blob left behind after file delete"
            );
        }

        info!(user_id = %ctx.user_id, file_id = %file_id, size = file.size_bytes, "File deleted");
        self.audit
            .record(
                SecurityEventKind::FileDeleted,
                Some(ctx.user_id),
                format!("Deleted {}", file.name),
            )
            .await;
        Ok(file)
    }
}
