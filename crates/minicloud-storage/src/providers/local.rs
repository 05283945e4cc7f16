//! Local filesystem blob store.
//!
//! Blobs live at `<root>/<owner_id>/<blob_id>`. Writes go to a `.part`
//! file first and are renamed into place once complete, so a reader never
//! sees a partial blob.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use minicloud_core::error::{AppError, ErrorKind};
use minicloud_core::result::AppResult;
use minicloud_core::traits::storage::{BlobStore, ByteStream};

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating the directory.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn owner_dir(&self, owner_id: Uuid) -> PathBuf {
        self.root.join(owner_id.to_string())
    }

    fn blob_path(&self, owner_id: Uuid, blob_id: Uuid) -> PathBuf {
        self.owner_dir(owner_id).join(blob_id.to_string())
    }

    async fn discard(&self, path: &PathBuf) {
        if let Err(e) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove partial blob");
        }
    }

    /// Copies `stream` into `file` and flushes it. The file is closed on
    /// return, whatever the outcome.
    async fn fill_part(mut file: fs::File, mut stream: ByteStream, max_bytes: u64) -> AppResult<u64> {
        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::InvalidInput, "Upload stream was interrupted", e)
            })?;
            total_bytes += chunk.len() as u64;
            if total_bytes > max_bytes {
                return Err(AppError::invalid_input(format!(
                    "File exceeds the maximum upload size of {max_bytes} bytes"
                )));
            }
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to write blob chunk", e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to flush blob", e))?;
        Ok(total_bytes)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn write(
        &self,
        owner_id: Uuid,
        blob_id: Uuid,
        stream: ByteStream,
        max_bytes: u64,
    ) -> AppResult<u64> {
        let dir = self.owner_dir(owner_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to create owner directory", e)
        })?;

        let final_path = self.blob_path(owner_id, blob_id);
        let part_path = dir.join(format!("{blob_id}.part"));
        let file = fs::File::create(&part_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to create blob file", e)
        })?;

        let copied = match Self::fill_part(file, stream, max_bytes).await {
            Ok(total_bytes) => fs::rename(&part_path, &final_path)
                .await
                .map(|()| total_bytes)
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Failed to finalize blob", e)
                }),
            Err(e) => Err(e),
        };
        let total_bytes = match copied {
            Ok(total_bytes) => total_bytes,
            Err(e) => {
                self.discard(&part_path).await;
                return Err(e);
            }
        };

        debug!(%owner_id, %blob_id, bytes = total_bytes, "Wrote blob");
        Ok(total_bytes)
    }

    async fn read(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<ByteStream> {
        let path = self.blob_path(owner_id, blob_id);
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found("File content not found")
            } else {
                AppError::with_source(ErrorKind::Internal, "Failed to open blob", e)
            }
        })?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn delete(&self, owner_id: Uuid, blob_id: Uuid) -> AppResult<()> {
        match fs::remove_file(self.blob_path(owner_id, blob_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Internal,
                "Failed to delete blob",
                e,
            )),
        }
    }

    async fn delete_owner(&self, owner_id: Uuid) -> AppResult<()> {
        match fs::remove_dir_all(self.owner_dir(owner_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Internal,
                "Failed to delete owner directory",
                e,
            )),
        }
    }
}
