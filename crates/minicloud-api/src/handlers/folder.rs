//! Folder hierarchy handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_entity::folder::{Crumb, Folder, FolderNode};
use minicloud_service::folder::CreateFolderRequest as SvcCreateFolder;

use crate::dto::request::{CreateFolderRequest, MoveFolderRequest};
use crate::dto::response::{ApiResponse, FolderSizeResponse, MessageResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/folders/create
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<Json<ApiResponse<Folder>>, AppError> {
    let folder = state
        .folder_service
        .create_folder(
            &auth,
            SvcCreateFolder {
                name: req.name,
                parent_id: req.parent_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/delete/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.folder_service.delete_folder(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Folder deleted successfully",
    ))))
}

/// POST /api/folders/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<MoveFolderRequest>,
) -> Result<Json<ApiResponse<Folder>>, AppError> {
    let folder = state
        .folder_service
        .move_folder(&auth, req.folder_id, req.target_parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/tree
pub async fn tree(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<FolderNode>>>, AppError> {
    let nodes = state.tree_service.tree(&auth).await?;
    Ok(Json(ApiResponse::ok(nodes)))
}

/// GET /api/folders/breadcrumb/{id}
pub async fn breadcrumb(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Crumb>>>, AppError> {
    let crumbs = state.tree_service.breadcrumb(&auth, id).await?;
    Ok(Json(ApiResponse::ok(crumbs)))
}

/// GET /api/folders/size/{id}
pub async fn folder_size(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FolderSizeResponse>>, AppError> {
    let size = state.tree_service.subtree_size(&auth, id).await?;
    Ok(Json(ApiResponse::ok(FolderSizeResponse {
        folder_id: id,
        size,
    })))
}
