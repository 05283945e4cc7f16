//! File download: ownership check, then a blob stream.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::traits::storage::{BlobStore, ByteStream};
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::file::File;

use super::service::FileService;
use crate::audit::SecurityAudit;
use crate::context::RequestContext;

/// File metadata plus its content stream.
pub struct DownloadResult {
    /// File metadata (name and content type feed the response headers).
    pub file: File,
    /// File content.
    pub content: ByteStream,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("file", &self.file)
            .finish()
    }
}

/// Streams the caller's files.
#[derive(Debug, Clone)]
pub struct DownloadService {
    lookup: FileService,
    blobs: Arc<dyn BlobStore>,
    audit: SecurityAudit,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(lookup: FileService, blobs: Arc<dyn BlobStore>, audit: SecurityAudit) -> Self {
        Self {
            lookup,
            blobs,
            audit,
        }
    }

    /// Opens one of the caller's files for reading.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<DownloadResult, AppError> {
        let file = self.lookup.get_file(ctx, file_id).await?;
        let content = self.blobs.read(file.owner_id, file.blob_id).await?;

        info!(user_id = %ctx.user_id, file_id = %file_id, "File downloaded");
        self.audit
            .record(
                SecurityEventKind::FileDownloaded,
                Some(ctx.user_id),
                format!("Downloaded {}", file.name),
            )
            .await;

        Ok(DownloadResult { file, content })
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use minicloud_core::ErrorKind;

    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn owner_reads_back_uploaded_bytes() {
        let h = Harness::new().await;
        let alice = h.user("alice").await;
        let file = h.upload(&alice, "notes.txt", None, b"hello").await.unwrap();

        let result = h.downloads.download(&alice, file.id).await.unwrap();
        assert_eq!(result.file.content_type, "text/plain");
        let chunks: Vec<bytes::Bytes> = result.content.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");

        let events = h.audit.recent(Some(1)).await.unwrap();
        assert_eq!(events[0].event_type, "file_downloaded");
    }

    #[tokio::test]
    async fn other_user_gets_not_found() {
        let h = Harness::new().await;
        let alice = h.user("alice").await;
        let bob = h.user("bob").await;
        let file = h.upload(&alice, "notes.txt", None, b"hello").await.unwrap();

        let err = h.downloads.download(&bob, file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
