//! Admin-only handlers. Authorization is decided by the services against
//! the caller's current record, not the token's claims.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_entity::audit::SecurityEvent;
use minicloud_entity::feature::ExtensionBlocklist;
use minicloud_service::feature::UpdateBlocklistRequest;
use minicloud_service::storage::UsageReconciliation;

use crate::dto::request::{
    AdminPasswordRequest, ChangeRoleRequest, ExtensionBlocklistRequest, SecurityLogQuery,
};
use crate::dto::response::{AdminUserResponse, ApiResponse, MessageResponse, UserResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<AdminUserResponse>>>, AppError> {
    let users = state.admin_user_service.list_users(&auth).await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(AdminUserResponse::from).collect(),
    )))
}

/// POST /api/admin/change-role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state
        .admin_user_service
        .change_role(&auth, req.user_id, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/admin/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<AdminPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state
        .admin_user_service
        .reset_password(&auth, req.user_id, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// DELETE /api/admin/delete-user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.admin_user_service.delete_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User deleted successfully",
    ))))
}

/// POST /api/admin/reconcile-storage/{id}
pub async fn reconcile_storage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UsageReconciliation>>, AppError> {
    let result = state.admin_user_service.reconcile_storage(&auth, id).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/admin/security-logs?limit=...
pub async fn security_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SecurityLogQuery>,
) -> Result<Json<ApiResponse<Vec<SecurityEvent>>>, AppError> {
    let events = state
        .admin_user_service
        .security_events(&auth, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}

/// GET /api/admin/features/extension-blocklist
pub async fn get_extension_blocklist(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ExtensionBlocklist>>, AppError> {
    let blocklist = state.feature_service.get_extension_blocklist(&auth).await?;
    Ok(Json(ApiResponse::ok(blocklist)))
}

/// PUT /api/admin/features/extension-blocklist
pub async fn set_extension_blocklist(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ExtensionBlocklistRequest>,
) -> Result<Json<ApiResponse<ExtensionBlocklist>>, AppError> {
    let blocklist = state
        .feature_service
        .set_extension_blocklist(
            &auth,
            UpdateBlocklistRequest {
                enabled: req.enabled,
                extensions: req.extensions,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(blocklist)))
}
