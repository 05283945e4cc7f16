//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use minicloud_auth::{JwtDecoder, JwtEncoder, LoginThrottle, PasswordHasher, PasswordValidator};
use minicloud_core::config::AppConfig;
use minicloud_core::error::AppError;
use minicloud_core::traits::storage::BlobStore;
use minicloud_database::RecordStore;
use minicloud_service::{
    AdminUserService, BootstrapReport, DownloadService, FeatureService, FileService,
    FolderService, SecurityAudit, SessionService, StorageAccounting, TreeService, UploadService,
    UserService, bootstrap,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Services are cheap
/// to clone; the heavier pieces sit behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Record store bundle (PostgreSQL or in-memory)
    pub store: RecordStore,
    /// Blob store provider
    pub blobs: Arc<dyn BlobStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,

    // ── Services ─────────────────────────────────────────────
    pub audit: SecurityAudit,
    pub feature_service: FeatureService,
    pub folder_service: FolderService,
    pub tree_service: TreeService,
    pub file_service: FileService,
    pub upload_service: UploadService,
    pub download_service: DownloadService,
    pub session_service: SessionService,
    pub user_service: UserService,
    pub admin_user_service: AdminUserService,
}

impl AppState {
    /// Wire every service over the given record and blob stores.
    pub fn build(config: AppConfig, store: RecordStore, blobs: Arc<dyn BlobStore>) -> Self {
        let password_hasher = Arc::new(PasswordHasher::new());
        let password_validator = Arc::new(PasswordValidator::new());
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let audit = SecurityAudit::new(Arc::clone(&store.security_logs));
        let accounting = StorageAccounting::new(Arc::clone(&store.users));
        let feature_service = FeatureService::new(
            Arc::clone(&store.features),
            Arc::clone(&store.users),
            audit.clone(),
        );
        let folder_service = FolderService::new(Arc::clone(&store.folders));
        let tree_service = TreeService::new(Arc::clone(&store.folders), Arc::clone(&store.files));
        let file_service = FileService::new(
            Arc::clone(&store.files),
            Arc::clone(&store.folders),
            Arc::clone(&blobs),
            audit.clone(),
        );
        let upload_service = UploadService::new(
            Arc::clone(&store.files),
            Arc::clone(&blobs),
            file_service.clone(),
            feature_service.clone(),
            audit.clone(),
            config.storage.max_upload_size_bytes,
        );
        let download_service =
            DownloadService::new(file_service.clone(), Arc::clone(&blobs), audit.clone());
        let session_service = SessionService::new(
            Arc::clone(&store.users),
            Arc::clone(&password_hasher),
            Arc::clone(&password_validator),
            jwt_encoder,
            LoginThrottle::new(Arc::clone(&store.login_attempts), &config.auth),
            audit.clone(),
        );
        let user_service = UserService::new(
            Arc::clone(&store.users),
            Arc::clone(&store.folders),
            Arc::clone(&store.files),
            Arc::clone(&password_hasher),
            Arc::clone(&password_validator),
            audit.clone(),
        );
        let admin_user_service = AdminUserService::new(
            Arc::clone(&store.users),
            Arc::clone(&blobs),
            Arc::clone(&password_hasher),
            password_validator,
            accounting,
            audit.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            blobs,
            jwt_decoder,
            password_hasher,
            audit,
            feature_service,
            folder_service,
            tree_service,
            file_service,
            upload_service,
            download_service,
            session_service,
            user_service,
            admin_user_service,
        }
    }

    /// Create the super-admin and seed feature settings on first boot.
    pub async fn bootstrap(&self) -> Result<BootstrapReport, AppError> {
        bootstrap(
            self.store.users.as_ref(),
            &self.feature_service,
            &self.password_hasher,
            &self.config,
        )
        .await
    }
}
