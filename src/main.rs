//! MiniCloud Server: multi-tenant personal cloud storage.
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use minicloud_api::{AppState, run_server};
use minicloud_core::config::{AppConfig, DatabaseProvider};
use minicloud_core::error::AppError;
use minicloud_database::{DatabasePool, RecordStore, migration};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `MINICLOUD_ENV` overlay, and
/// `MINICLOUD__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MINICLOUD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MiniCloud v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Record store ─────────────────────────────────────
    let store = match config.database.provider {
        DatabaseProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            migration::run_migrations(pool.pool()).await?;
            RecordStore::postgres(pool)
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on exit");
            RecordStore::memory()
        }
    };
    tracing::info!(provider = store.provider_type(), "Record store ready");

    // ── Step 2: Blob store ───────────────────────────────────────
    let blobs = minicloud_storage::build_blob_store(&config.storage).await?;
    tracing::info!(provider = blobs.provider_type(), "Blob store ready");

    // ── Step 3: Services + first-boot bootstrap ──────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::build(config, store.clone(), blobs);
    let report = state.bootstrap().await?;
    tracing::info!(
        super_admin_created = report.super_admin_created,
        features_seeded = report.features_seeded,
        "Bootstrap complete"
    );

    // ── Step 4: Serve until shutdown ─────────────────────────────
    let served = run_server(state).await;

    // ── Step 5: Release the pool ─────────────────────────────────
    if tokio::time::timeout(grace, store.close()).await.is_err() {
        tracing::warn!("Timed out closing the record store");
    }
    tracing::info!("MiniCloud stopped");

    served
}
