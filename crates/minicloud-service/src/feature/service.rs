//! Feature setting reads, admin updates, and first-boot seeding.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use minicloud_auth::{AccessEvaluator, AdminAction};
use minicloud_core::config::FeaturesConfig;
use minicloud_core::error::AppError;
use minicloud_database::{FeatureStore, UserStore};
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::feature::{ExtensionBlocklist, FeatureSetting};

use crate::audit::SecurityAudit;
use crate::context::RequestContext;

/// Replacement value for the extension blocklist.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBlocklistRequest {
    /// Whether uploads are checked.
    pub enabled: bool,
    /// Extensions, with or without the leading dot.
    pub extensions: Vec<String>,
}

/// Reads and manages typed feature settings.
#[derive(Debug, Clone)]
pub struct FeatureService {
    features: Arc<dyn FeatureStore>,
    users: Arc<dyn UserStore>,
    access: AccessEvaluator,
    audit: SecurityAudit,
}

impl FeatureService {
    /// Creates a new feature service.
    pub fn new(
        features: Arc<dyn FeatureStore>,
        users: Arc<dyn UserStore>,
        audit: SecurityAudit,
    ) -> Self {
        Self {
            features,
            users,
            access: AccessEvaluator::new(),
            audit,
        }
    }

    /// The active blocklist. A missing row means nothing is blocked.
    pub async fn extension_blocklist(&self) -> Result<ExtensionBlocklist, AppError> {
        let Some(record) = self.features.get(FeatureSetting::EXTENSION_BLOCKLIST).await? else {
            return Ok(ExtensionBlocklist::new(false, Vec::<String>::new()));
        };
        match FeatureSetting::from_record(&record)? {
            FeatureSetting::ExtensionBlocklist(list) => Ok(list),
        }
    }

    /// Admin read of the blocklist.
    pub async fn get_extension_blocklist(
        &self,
        ctx: &RequestContext,
    ) -> Result<ExtensionBlocklist, AppError> {
        let actor = ctx.current_actor(self.users.as_ref()).await?;
        self.access
            .authorize_admin(&actor, AdminAction::ManageFeatures, None)?;
        self.extension_blocklist().await
    }

    /// Admin replacement of the blocklist.
    pub async fn set_extension_blocklist(
        &self,
        ctx: &RequestContext,
        req: UpdateBlocklistRequest,
    ) -> Result<ExtensionBlocklist, AppError> {
        let actor = ctx.current_actor(self.users.as_ref()).await?;
        self.access
            .authorize_admin(&actor, AdminAction::ManageFeatures, None)?;

        let list = ExtensionBlocklist::new(req.enabled, req.extensions);
        let setting = FeatureSetting::ExtensionBlocklist(list.clone());
        self.features.upsert(&setting.to_record()?).await?;

        info!(
            admin_id = %ctx.user_id,
            enabled = list.enabled,
            count = list.extensions.len(),
            "Extension blocklist updated"
        );
        self.audit
            .record(
                SecurityEventKind::FeatureUpdated,
                Some(ctx.user_id),
                format!(
                    "Extension blocklist {} with {} extensions",
                    if list.enabled { "enabled" } else { "disabled" },
                    list.extensions.len()
                ),
            )
            .await;

        Ok(list)
    }

    /// Writes configured defaults for settings that have no row yet.
    /// Returns whether anything was written.
    pub async fn seed(&self, config: &FeaturesConfig) -> Result<bool, AppError> {
        let seed = &config.extension_blocklist;
        let setting = FeatureSetting::ExtensionBlocklist(ExtensionBlocklist::new(
            seed.enabled,
            &seed.extensions,
        ));
        let written = self.features.insert_if_absent(&setting.to_record()?).await?;
        if written {
            info!(feature = setting.name(), "Feature setting seeded");
        }
        Ok(written)
    }
}
