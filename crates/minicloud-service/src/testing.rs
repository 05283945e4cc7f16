//! In-memory service graph shared by unit tests.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream;

use minicloud_auth::{JwtDecoder, JwtEncoder, LoginThrottle, PasswordHasher, PasswordValidator};
use minicloud_core::config::AppConfig;
use minicloud_core::error::AppError;
use minicloud_core::traits::storage::ByteStream;
use minicloud_database::MemoryRecordStore;
use minicloud_entity::file::File;
use minicloud_entity::user::{CreateUser, UserRole};
use minicloud_storage::MemoryBlobStore;
use uuid::Uuid;

use crate::file::UploadRequest;
use crate::session::{LoginRequest, LoginResponse, RegisterRequest};
use crate::{
    AdminUserService, DownloadService, FeatureService, FileService, FolderService,
    RequestContext, SecurityAudit, SessionService, StorageAccounting, TreeService,
    UploadService, UserService, bootstrap,
};

/// Password satisfying the policy, used for every test account.
pub const PASSWORD: &str = "Passw0rd!";

pub struct Harness {
    pub store: Arc<MemoryRecordStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub hasher: Arc<PasswordHasher>,
    pub decoder: JwtDecoder,
    pub audit: SecurityAudit,
    pub accounting: StorageAccounting,
    pub features: FeatureService,
    pub folders: FolderService,
    pub tree: TreeService,
    pub files: FileService,
    pub uploads: UploadService,
    pub downloads: DownloadService,
    pub sessions: SessionService,
    pub users: UserService,
    pub admin: AdminUserService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_upload_limit(1024 * 1024).await
    }

    pub async fn with_upload_limit(max_upload_bytes: u64) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret".into();
        config.auth.bootstrap_admin_username = "root".into();
        config.auth.bootstrap_admin_email = "root@example.com".into();
        config.auth.bootstrap_admin_password = PASSWORD.into();
        config.storage.max_upload_size_bytes = max_upload_bytes;

        let store = Arc::new(MemoryRecordStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new());

        let audit = SecurityAudit::new(store.clone());
        let accounting = StorageAccounting::new(store.clone());
        let features = FeatureService::new(store.clone(), store.clone(), audit.clone());
        let folders = FolderService::new(store.clone());
        let tree = TreeService::new(store.clone(), store.clone());
        let files = FileService::new(store.clone(), store.clone(), blobs.clone(), audit.clone());
        let uploads = UploadService::new(
            store.clone(),
            blobs.clone(),
            files.clone(),
            features.clone(),
            audit.clone(),
            config.storage.max_upload_size_bytes,
        );
        let downloads = DownloadService::new(files.clone(), blobs.clone(), audit.clone());
        let sessions = SessionService::new(
            store.clone(),
            hasher.clone(),
            validator.clone(),
            Arc::new(JwtEncoder::new(&config.auth)),
            LoginThrottle::new(store.clone(), &config.auth),
            audit.clone(),
        );
        let users = UserService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            hasher.clone(),
            validator.clone(),
            audit.clone(),
        );
        let admin = AdminUserService::new(
            store.clone(),
            blobs.clone(),
            hasher.clone(),
            validator,
            accounting.clone(),
            audit.clone(),
        );

        bootstrap(store.as_ref(), &features, &hasher, &config)
            .await
            .unwrap();

        Self {
            decoder: JwtDecoder::new(&config.auth),
            store,
            blobs,
            hasher,
            audit,
            accounting,
            features,
            folders,
            tree,
            files,
            uploads,
            downloads,
            sessions,
            users,
            admin,
        }
    }

    /// Registers a regular account and returns its context.
    pub async fn user(&self, username: &str) -> RequestContext {
        let user = self
            .sessions
            .register(RegisterRequest {
                username: username.into(),
                email: format!("{username}@example.com"),
                password: PASSWORD.into(),
            })
            .await
            .unwrap();
        RequestContext::new(user.id, user.username, user.role, user.is_super_admin)
    }

    /// Creates a regular account without hashing a real password.
    pub async fn owner(&self, username: &str) -> RequestContext {
        use minicloud_database::UserStore;

        let user = UserStore::create(
            self.store.as_ref(),
            &CreateUser::regular(username, format!("{username}@example.com"), "unused".into()),
        )
        .await
        .unwrap();
        RequestContext::new(user.id, user.username, user.role, false)
    }

    /// Creates a non-super admin account and returns its context.
    pub async fn admin_user(&self, username: &str) -> RequestContext {
        use minicloud_database::UserStore;

        let user = UserStore::create(
            self.store.as_ref(),
            &CreateUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: self.hasher.hash_password(PASSWORD).unwrap(),
                role: UserRole::Admin,
                is_super_admin: false,
            },
        )
        .await
        .unwrap();
        RequestContext::new(user.id, user.username, user.role, false)
    }

    /// Context of the bootstrapped super-admin (`root`).
    pub async fn super_admin(&self) -> RequestContext {
        let resp = self.login("root", PASSWORD).await.unwrap();
        let claims = self.decoder.decode(&resp.token).unwrap();
        RequestContext::from_claims(&claims)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        self.sessions
            .login(LoginRequest {
                username: username.into(),
                password: password.into(),
            })
            .await
    }

    pub fn content(bytes: &[u8]) -> ByteStream {
        let chunks: Vec<Result<Bytes, std::io::Error>> = bytes
            .chunks(3)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Box::pin(stream::iter(chunks))
    }

    pub async fn upload(
        &self,
        ctx: &RequestContext,
        name: &str,
        folder_id: Option<Uuid>,
        bytes: &[u8],
    ) -> Result<File, AppError> {
        self.uploads
            .upload(
                ctx,
                UploadRequest {
                    file_name: name.into(),
                    folder_id,
                    content: Self::content(bytes),
                },
            )
            .await
    }
}
