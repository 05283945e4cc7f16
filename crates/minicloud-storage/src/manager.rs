//! Blob store selection from configuration.

use std::sync::Arc;

use tracing::info;

use minicloud_core::config::{StorageConfig, StorageProviderKind};
use minicloud_core::result::AppResult;
use minicloud_core::traits::storage::BlobStore;

use crate::providers::{LocalBlobStore, MemoryBlobStore};

/// Build the configured blob store.
pub async fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider {
        StorageProviderKind::Local => Arc::new(LocalBlobStore::new(&config.root_path).await?),
        StorageProviderKind::Memory => Arc::new(MemoryBlobStore::new()),
    };
    info!(provider = store.provider_type(), "Blob store initialized");
    Ok(store)
}
