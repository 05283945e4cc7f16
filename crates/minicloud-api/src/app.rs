//! Application builder: wires router, middleware and state into an Axum app
//! and serves it until a shutdown signal arrives.

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use minicloud_core::error::AppError;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Binds the configured address and serves the app until Ctrl+C or
/// SIGTERM, then drains open connections for at most
/// `server.shutdown_grace_seconds`.
pub async fn run_server(state: AppState) -> Result<(), AppError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("MiniCloud server listening on {}", addr);

    let (signal_tx, mut signal_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(true);
        })
        .into_future();

    let deadline = async move {
        if signal_rx.wait_for(|fired| *fired).await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = deadline => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
