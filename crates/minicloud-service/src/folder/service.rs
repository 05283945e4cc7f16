//! Folder create, move, and delete for the caller's own tree.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_database::FolderStore;
use minicloud_entity::folder::{CreateFolder, Folder};

use crate::context::RequestContext;

/// Request to create a new folder.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (`None` for root level).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Structural changes to one owner's folder forest.
///
/// Every check and its write run as one unit inside the record store, so
/// concurrent moves in the same tree cannot combine into a cycle.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// Creates a folder under `parent_id` in the caller's tree.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> Result<Folder, AppError> {
        let name = Folder::normalize_name(&req.name)?;
        let folder = self
            .folders
            .create(&CreateFolder {
                owner_id: ctx.user_id,
                parent_id: req.parent_id,
                name,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Moves a folder under `new_parent` (`None` for root level).
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let folder = self
            .folders
            .move_to(ctx.user_id, folder_id, new_parent)
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            parent_id = ?new_parent,
            "Folder moved"
        );
        Ok(folder)
    }

    /// Deletes an empty folder. There is no recursive delete.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> Result<(), AppError> {
        self.folders.delete_if_empty(ctx.user_id, folder_id).await?;
        info!(user_id = %ctx.user_id, folder_id = %folder_id, "Folder deleted");
        Ok(())
    }
}
