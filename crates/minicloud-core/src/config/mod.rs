//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section has a `Default` so tests can build a
//! configuration without touching the filesystem.

pub mod app;
pub mod auth;
pub mod database;
pub mod features;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, MAX_LOGIN_WINDOW_MINUTES, MAX_TOKEN_TTL_HOURS};
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::features::{ExtensionBlocklistConfig, FeaturesConfig};
pub use self::logging::LoggingConfig;
pub use self::storage::{StorageConfig, StorageProviderKind};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Initial feature settings.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, the overlay `config/{env}.toml`, and
    /// environment variables prefixed with `MINICLOUD__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MINICLOUD")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .with_list_parse_key("features.extension_blocklist.extensions")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.server.port == 0 {
            return Err(AppError::configuration("server.port must be non-zero"));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS.unsigned_abs()).contains(&self.auth.token_ttl_hours) {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}"
            )));
        }
        if !(1..=MAX_LOGIN_WINDOW_MINUTES.unsigned_abs()).contains(&self.auth.login_window_minutes) {
            return Err(AppError::configuration(format!(
                "auth.login_window_minutes must be between 1 and {MAX_LOGIN_WINDOW_MINUTES}"
            )));
        }
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres provider",
            ));
        }
        Ok(())
    }
}
