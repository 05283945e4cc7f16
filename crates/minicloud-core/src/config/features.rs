//! Initial values for feature settings.
//!
//! These seed the `plugins` table at first boot. Once a setting exists in
//! the record store, the stored value wins and these are ignored.

use serde::{Deserialize, Serialize};

/// Feature settings seeded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Upload extension blocklist.
    #[serde(default)]
    pub extension_blocklist: ExtensionBlocklistConfig,
}

/// Seed for the extension blocklist feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionBlocklistConfig {
    /// Whether uploads are checked against the list.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Blocked extensions, with or without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ExtensionBlocklistConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            extensions: default_extensions(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    [
        ".php", ".exe", ".bat", ".cmd", ".sh", ".js", ".html", ".htm", ".jsp", ".asp", ".aspx",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}
