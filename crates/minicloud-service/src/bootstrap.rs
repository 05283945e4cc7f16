//! First-boot initialization: the super-admin account and feature seeds.

use tracing::{info, warn};
use uuid::Uuid;

use minicloud_auth::{PasswordHasher, PasswordValidator};
use minicloud_core::config::AppConfig;
use minicloud_core::error::AppError;
use minicloud_database::UserStore;
use minicloud_entity::user::{CreateUser, UserRole};

use crate::feature::FeatureService;

/// What the startup pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// A super-admin account was created.
    pub super_admin_created: bool,
    /// Feature settings were seeded from configuration.
    pub features_seeded: bool,
}

/// Creates the super-admin if none exists and seeds feature settings.
///
/// With no configured password a random one is generated and logged once
/// at `warn` level.
pub async fn bootstrap(
    users: &dyn UserStore,
    features: &FeatureService,
    hasher: &PasswordHasher,
    config: &AppConfig,
) -> Result<BootstrapReport, AppError> {
    let mut report = BootstrapReport::default();

    if let Some(existing) = users.find_super_admin().await? {
        info!(username = %existing.username, "Super admin present");
    } else {
        let auth = &config.auth;
        let (password, generated) = if auth.bootstrap_admin_password.is_empty() {
            (format!("Mc!{}", Uuid::new_v4().simple()), true)
        } else {
            (auth.bootstrap_admin_password.clone(), false)
        };
        PasswordValidator::new().validate(&password).map_err(|e| {
            AppError::configuration(format!(
                "auth.bootstrap_admin_password rejected: {}",
                e.message
            ))
        })?;

        let admin = users
            .create(&CreateUser {
                username: auth.bootstrap_admin_username.clone(),
                email: auth.bootstrap_admin_email.clone(),
                password_hash: hasher.hash_password(&password)?,
                role: UserRole::Admin,
                is_super_admin: true,
            })
            .await?;

        if generated {
            warn!(
                username = %admin.username,
                password = %password,
                "Super admin created with a generated password; change it after first login"
            );
        } else {
            info!(username = %admin.username, "Super admin created");
        }
        report.super_admin_created = true;
    }

    report.features_seeded = features.seed(&config.features).await?;
    Ok(report)
}
