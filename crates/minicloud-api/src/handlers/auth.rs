//! Auth handlers: register, login, change password, me.

use axum::Json;
use axum::extract::State;

use minicloud_core::error::AppError;
use minicloud_service::session::{LoginRequest as SvcLogin, RegisterRequest as SvcRegister};
use minicloud_service::user::ChangePasswordRequest as SvcChangePassword;

use crate::dto::request::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, UserResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state
        .session_service
        .register(SvcRegister {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let result = state
        .session_service
        .login(SvcLogin {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user.into(),
    })))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state
        .user_service
        .change_password(
            &auth,
            SvcChangePassword {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
