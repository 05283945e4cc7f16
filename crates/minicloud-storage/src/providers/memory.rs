//! In-memory blob store.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use minicloud_core::error::{AppError, ErrorKind};
use minicloud_core::result::AppResult;
use minicloud_core::traits::storage::{BlobStore, ByteStream};

/// Blobs held in a concurrent map keyed by `(owner, blob)`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<(Uuid, Uuid), Bytes>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Whether a blob exists.
    pub fn contains(&self, owner_id: Uuid, blob_id: Uuid) -> bool {
        self.blobs.contains_key(&(owner_id, blob_id))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn write(
        &self,
        owner_id: Uuid,
        blob_id: Uuid,
        mut stream: ByteStream,
        max_bytes: u64,
    ) -> AppResult<u64> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::InvalidInput, "Upload stream was interrupted", e)
            })?;
            if (buffer.len() + chunk.len()) as u64 > max_bytes {
                return Err(AppError::invalid_input(format!(
                    "File exceeds the maximum upload size of {max_bytes} bytes"
                )));
            }
            buffer.extend_from_slice(&chunk);
        }
        let size = buffer.len() as u64;
        self.blobs.insert((owner_id, blob_id), buffer.freeze());
        Ok(size)
    }

    async fn read(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<ByteStream> {
        let data = self
            .blobs
            .get(&(owner_id, blob_id))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found("File content not found"))?;
        Ok(Box::pin(stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn delete(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<()> {
        self.blobs.remove(&(owner_id, blob_id));
        Ok(())
    }

    async fn delete_owner(&self, owner_id: Uuid) -> AppResult<()> {
        self.blobs.retain(|(owner, _), _| *owner != owner_id);
        Ok(())
    }
}
