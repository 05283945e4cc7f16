//! Self-service user handlers.

use axum::Json;
use axum::extract::State;

use minicloud_core::error::AppError;
use minicloud_service::user::UserStats;

use crate::dto::request::UpdateLanguageRequest;
use crate::dto::response::{ApiResponse, UserResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/user/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserStats>>, AppError> {
    let stats = state.user_service.stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// PUT /api/user/language
pub async fn set_language(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateLanguageRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.user_service.set_language(&auth, &req.language).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
