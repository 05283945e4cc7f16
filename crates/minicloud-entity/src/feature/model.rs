//! Typed feature settings.
//!
//! The `plugins` table stores `(name, enabled, settings)` rows with an
//! untyped JSON settings column. Only known feature names are accepted;
//! each one decodes into a variant of [`FeatureSetting`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use minicloud_core::{AppError, AppResult};

use crate::file::model::extension_of;

/// A raw `plugins` row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeatureRecord {
    /// Feature name (primary key).
    pub name: String,
    /// Whether the feature is active.
    pub enabled: bool,
    /// Feature-specific settings.
    pub settings: serde_json::Value,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Upload extension blocklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionBlocklist {
    /// Whether uploads are checked.
    pub enabled: bool,
    /// Lowercase extensions with leading dots, sorted and deduplicated.
    pub extensions: Vec<String>,
}

impl ExtensionBlocklist {
    /// Build a blocklist, normalizing each extension to `.lower`.
    pub fn new(enabled: bool, extensions: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        extensions.sort();
        extensions.dedup();
        Self {
            enabled,
            extensions,
        }
    }

    /// Whether an upload named `file_name` must be rejected.
    pub fn blocks(&self, file_name: &str) -> bool {
        if !self.enabled {
            return false;
        }
        extension_of(file_name).is_some_and(|ext| self.extensions.contains(&ext))
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

#[derive(Serialize, Deserialize)]
struct ExtensionBlocklistSettings {
    #[serde(default)]
    extensions: Vec<String>,
}

/// Every feature the service knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum FeatureSetting {
    /// Reject uploads by extension.
    ExtensionBlocklist(ExtensionBlocklist),
}

impl FeatureSetting {
    /// Row name of the extension blocklist.
    pub const EXTENSION_BLOCKLIST: &'static str = "extension_blocklist";

    /// Row name for this setting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExtensionBlocklist(_) => Self::EXTENSION_BLOCKLIST,
        }
    }

    /// Encode as a `plugins` row.
    pub fn to_record(&self) -> AppResult<FeatureRecord> {
        let (enabled, settings) = match self {
            Self::ExtensionBlocklist(list) => (
                list.enabled,
                serde_json::to_value(ExtensionBlocklistSettings {
                    extensions: list.extensions.clone(),
                })?,
            ),
        };
        Ok(FeatureRecord {
            name: self.name().to_string(),
            enabled,
            settings,
            updated_at: Utc::now(),
        })
    }

    /// Decode a `plugins` row.
    pub fn from_record(record: &FeatureRecord) -> AppResult<Self> {
        match record.name.as_str() {
            Self::EXTENSION_BLOCKLIST => {
                let settings: ExtensionBlocklistSettings =
                    serde_json::from_value(record.settings.clone()).map_err(|e| {
                        AppError::with_source(
                            minicloud_core::ErrorKind::Internal,
                            "Malformed extension blocklist settings",
                            e,
                        )
                    })?;
                Ok(Self::ExtensionBlocklist(ExtensionBlocklist::new(
                    record.enabled,
                    settings.extensions,
                )))
            }
            other => Err(AppError::invalid_input(format!("Unknown feature: '{other}'"))),
        }
    }
}
