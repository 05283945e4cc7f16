//! Blob store trait for pluggable file content backends.
//!
//! A blob is the raw byte content of one file, addressed by its owner and
//! an opaque blob id. The record store never sees bytes and the blob store
//! never sees names or folders.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;

use crate::result::AppResult;

/// A byte stream type used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Implementations live in `minicloud-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write a byte stream and return the number of bytes stored.
    ///
    /// Fails with `InvalidInput` once more than `max_bytes` have been read;
    /// nothing is left behind in that case.
    async fn write(
        &self,
        owner_id: Uuid,
        blob_id: Uuid,
        stream: ByteStream,
        max_bytes: u64,
    ) -> AppResult<u64>;

    /// Open a blob for reading. Fails with `NotFound` if it does not exist.
    async fn read(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<ByteStream>;

    /// Remove a blob. Removing a missing blob is not an error.
    async fn delete(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<()>;

    /// Remove every blob belonging to an owner.
    async fn delete_owner(&self, owner_id: Uuid) -> AppResult<()>;
}
