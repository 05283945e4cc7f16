//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = ComponentHealth {
        provider: state.store.provider_type().to_string(),
        healthy: state.store.health_check().await.unwrap_or(false),
    };
    let storage = ComponentHealth {
        provider: state.blobs.provider_type().to_string(),
        healthy: state.blobs.health_check().await.unwrap_or(false),
    };

    let status = if database.healthy && storage.healthy {
        "ok"
    } else {
        tracing::warn!(
            database = database.healthy,
            storage = storage.healthy,
            "Health check degraded"
        );
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        storage,
    }))
}
