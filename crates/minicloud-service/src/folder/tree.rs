//! Folder tree listing, breadcrumbs, and recursive sizes.
//!
//! Sizes are derived from a fresh snapshot on every call; nothing is
//! cached between calls.

use std::sync::Arc;

use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_database::{FileStore, FolderStore};
use minicloud_entity::folder::{Crumb, FolderGraph, FolderNode};

use crate::context::RequestContext;

/// Read-only views over the caller's folder forest.
#[derive(Debug, Clone)]
pub struct TreeService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    async fn graph(&self, owner_id: Uuid, with_files: bool) -> Result<FolderGraph, AppError> {
        let folders = self.folders.list_by_owner(owner_id).await?;
        let graph = FolderGraph::new(folders);
        if !with_files {
            return Ok(graph);
        }
        let files = self.files.list_by_owner(owner_id).await?;
        Ok(graph.with_files(&files))
    }

    /// Every folder of the caller with its recursive size.
    pub async fn tree(&self, ctx: &RequestContext) -> Result<Vec<FolderNode>, AppError> {
        Ok(self.graph(ctx.user_id, true).await?.nodes())
    }

    /// Root-to-leaf path ending at `folder_id`. A folder the caller does
    /// not own is `NotFound`, never an empty path.
    pub async fn breadcrumb(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Vec<Crumb>, AppError> {
        self.graph(ctx.user_id, false)
            .await?
            .breadcrumb(folder_id)
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Bytes in `folder_id` and every folder below it.
    pub async fn subtree_size(&self, ctx: &RequestContext, folder_id: Uuid) -> Result<i64, AppError> {
        let graph = self.graph(ctx.user_id, true).await?;
        if !graph.contains(folder_id) {
            return Err(AppError::not_found("Folder not found"));
        }
        Ok(graph.subtree_size(folder_id))
    }
}
