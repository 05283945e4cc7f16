//! Single-request file upload.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::traits::storage::{BlobStore, ByteStream};
use minicloud_database::FileStore;
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::file::{CreateFile, File};

use super::service::FileService;
use crate::audit::SecurityAudit;
use crate::context::RequestContext;
use crate::feature::FeatureService;

/// Content type used when the name gives no hint.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One incoming file.
pub struct UploadRequest {
    /// Name as sent by the client; any directory part is dropped.
    pub file_name: String,
    /// Target folder (`None` for root level).
    pub folder_id: Option<Uuid>,
    /// File content.
    pub content: ByteStream,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("file_name", &self.file_name)
            .field("folder_id", &self.folder_id)
            .finish()
    }
}

/// Writes a blob and its record as one logical unit.
#[derive(Debug, Clone)]
pub struct UploadService {
    files: Arc<dyn FileStore>,
    blobs: Arc<dyn BlobStore>,
    placement: FileService,
    features: FeatureService,
    audit: SecurityAudit,
    max_upload_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        files: Arc<dyn FileStore>,
        blobs: Arc<dyn BlobStore>,
        placement: FileService,
        features: FeatureService,
        audit: SecurityAudit,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            files,
            blobs,
            placement,
            features,
            audit,
            max_upload_bytes,
        }
    }

    /// Uploads a file for the caller.
    ///
    /// The blob is written first. If the record insert then fails, the
    /// blob is removed again (best effort).
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> Result<File, AppError> {
        let name = sanitize_file_name(&req.file_name)?;

        let blocklist = self.features.extension_blocklist().await?;
        if blocklist.blocks(&name) {
            return Err(AppError::invalid_input(
                "File type not allowed for security reasons",
            ));
        }

        let folder_id = self.placement.place_file(ctx, req.folder_id).await?;

        let file_id = Uuid::new_v4();
        let blob_id = Uuid::new_v4();
        let written = self
            .blobs
            .write(ctx.user_id, blob_id, req.content, self.max_upload_bytes)
            .await?;
        let size_bytes = i64::try_from(written)
            .map_err(|_| AppError::invalid_input("File too large"))?;

        let content_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let record = CreateFile {
            id: file_id,
            owner_id: ctx.user_id,
            folder_id,
            name,
            size_bytes,
            content_type,
            blob_id,
        };

        let file = match self.files.insert(&record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(ctx.user_id, blob_id).await {
                    warn!(
                        blob_id = %blob_id,
                        error = %cleanup,
                        "Orphaned blob after failed upload"
                    );
                }
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            size = file.size_bytes,
            content_type = %file.content_type,
            "File uploaded"
        );
        self.audit
            .record(
                SecurityEventKind::FileUploaded,
                Some(ctx.user_id),
                format!("Uploaded {} ({} bytes)", file.name, file.size_bytes),
            )
            .await;

        Ok(file)
    }
}

/// Keeps the last path component of a client-supplied name.
fn sanitize_file_name(raw: &str) -> Result<String, AppError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::invalid_input("File name is required"));
    }
    Ok(name.to_string())
}
