//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Which blob store holds file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Files under `root_path/<owner>/<blob>`.
    #[default]
    Local,
    /// Process-local buffers.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob store backend.
    #[serde(default)]
    pub provider: StorageProviderKind,
    /// Root path for local blob storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 100 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProviderKind::Local,
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MiB
}
