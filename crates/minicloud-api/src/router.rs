//! Route definitions for the MiniCloud HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the `folder_id` field on top of the
/// file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the API router with every route mounted under `/api`.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(file_routes())
        .merge(folder_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Auth endpoints: register, login, change password, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/auth/me", get(handlers::auth::me))
}

/// Current-user endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/stats", get(handlers::user::stats))
        .route("/user/language", put(handlers::user::set_language))
}

/// File endpoints
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(handlers::file::upload_file))
        .route("/files/download/{id}", get(handlers::file::download_file))
        .route("/files/delete/{id}", delete(handlers::file::delete_file))
        .route("/files/move", post(handlers::file::move_file))
        .route("/files/list", get(handlers::file::list_files))
}

/// Folder endpoints
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders/create", post(handlers::folder::create_folder))
        .route(
            "/folders/delete/{id}",
            delete(handlers::folder::delete_folder),
        )
        .route("/folders/move", post(handlers::folder::move_folder))
        .route("/folders/tree", get(handlers::folder::tree))
        .route(
            "/folders/breadcrumb/{id}",
            get(handlers::folder::breadcrumb),
        )
        .route("/folders/size/{id}", get(handlers::folder::folder_size))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        // User management
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/change-role", post(handlers::admin::change_role))
        .route(
            "/admin/change-password",
            post(handlers::admin::change_password),
        )
        .route(
            "/admin/delete-user/{id}",
            delete(handlers::admin::delete_user),
        )
        .route(
            "/admin/reconcile-storage/{id}",
            post(handlers::admin::reconcile_storage),
        )
        // Audit
        .route("/admin/security-logs", get(handlers::admin::security_logs))
        // Features
        .route(
            "/admin/features/extension-blocklist",
            get(handlers::admin::get_extension_blocklist)
                .put(handlers::admin::set_extension_blocklist),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
