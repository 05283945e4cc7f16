//! Record store traits.
//!
//! One trait per table. Every method that changes the folder tree, a
//! file's placement, or a storage counter is a single atomic unit scoped
//! to the owner: implementations validate against the owner's current
//! state and write under the same lock or transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use minicloud_core::result::AppResult;
use minicloud_entity::audit::{NewSecurityEvent, SecurityEvent};
use minicloud_entity::feature::FeatureRecord;
use minicloud_entity::file::{CreateFile, File};
use minicloud_entity::folder::{CreateFolder, Folder};
use minicloud_entity::user::{CreateUser, User, UserRole, UserWithCounts};

use crate::connection::DatabasePool;
use crate::memory::MemoryRecordStore;
use crate::repositories::{
    FeatureRepository, FileRepository, FolderRepository, LoginAttemptRepository,
    SecurityLogRepository, UserRepository,
};

/// Accounts and their storage counters.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// The bootstrap super-admin, if created.
    async fn find_super_admin(&self) -> AppResult<Option<User>>;

    /// Every user with file and folder counts, oldest first.
    async fn list_with_counts(&self) -> AppResult<Vec<UserWithCounts>>;

    /// Insert a user. Duplicate username, email, or a second super-admin
    /// fail with `Conflict`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Replace the password hash of any account.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Replace the password hash unless the account is the super-admin
    /// (`Forbidden`).
    async fn reset_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Change the role unless the account is the super-admin (`Forbidden`).
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    /// Set the preferred UI language.
    async fn update_language(&self, id: Uuid, language: &str) -> AppResult<User>;

    /// Add `delta` bytes to the storage counter (negative to subtract),
    /// flooring at zero. Returns the new value.
    async fn adjust_storage(&self, id: Uuid, delta: i64) -> AppResult<i64>;

    /// Set the storage counter to the sum of the user's file sizes.
    /// Returns `(previous, current)`.
    async fn recompute_storage(&self, id: Uuid) -> AppResult<(i64, i64)>;

    /// Delete the user's files, folders, and account in one unit.
    /// The super-admin cannot be deleted (`Forbidden`).
    async fn delete_cascade(&self, id: Uuid) -> AppResult<()>;
}

/// Per-owner folder forest.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug {
    /// Find a folder by ID regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// All folders of one owner.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Number of folders an owner has.
    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64>;

    /// Create a folder. `NotFound` if the parent is not the owner's,
    /// `Conflict` on a sibling name clash.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Reparent a folder. `NotFound` if either folder is not the owner's,
    /// `InvalidOperation` if the target is the folder or below it,
    /// `Conflict` on a sibling name clash at the target.
    async fn move_to(&self, owner_id: Uuid, folder_id: Uuid, new_parent: Option<Uuid>)
    -> AppResult<Folder>;

    /// Delete a folder with no subfolders and no files (`NotEmpty`
    /// otherwise, `NotFound` if not the owner's).
    async fn delete_if_empty(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<()>;
}

/// File records and their effect on storage counters.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug {
    /// Find a file by ID regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Files an owner keeps directly in `folder_id` (`None` for root).
    async fn list_in_folder(&self, owner_id: Uuid, folder_id: Option<Uuid>) -> AppResult<Vec<File>>;

    /// Every file of one owner.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>>;

    /// Number of files an owner has.
    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64>;

    /// Insert a record into the owner's folder and credit its size to the
    /// owner's counter. `NotFound` if the folder is not the owner's.
    async fn insert(&self, data: &CreateFile) -> AppResult<File>;

    /// Move a file. `NotFound` if the file or the folder is not the
    /// owner's.
    async fn move_to(&self, owner_id: Uuid, file_id: Uuid, folder_id: Option<Uuid>)
    -> AppResult<File>;

    /// Delete a record and debit its recorded size. Returns the removed
    /// record so the caller can drop the blob.
    async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File>;
}

/// Append-only security ledger.
#[async_trait]
pub trait SecurityLogStore: Send + Sync + std::fmt::Debug {
    /// Append an event.
    async fn append(&self, event: &NewSecurityEvent) -> AppResult<SecurityEvent>;

    /// Most recent events first.
    async fn recent(&self, limit: i64) -> AppResult<Vec<SecurityEvent>>;
}

/// Failed login attempts for the sliding window.
#[async_trait]
pub trait LoginAttemptStore: Send + Sync + std::fmt::Debug {
    /// Record a failed attempt at `at`.
    async fn record_failure(&self, username: &str, at: DateTime<Utc>) -> AppResult<()>;

    /// Failed attempts for `username` at or after `since`.
    async fn count_failures_since(&self, username: &str, since: DateTime<Utc>) -> AppResult<i64>;

    /// Drop attempts older than `cutoff`. Returns the number removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Rows of the `plugins` table.
#[async_trait]
pub trait FeatureStore: Send + Sync + std::fmt::Debug {
    /// Load a feature by name.
    async fn get(&self, name: &str) -> AppResult<Option<FeatureRecord>>;

    /// Insert or replace a feature.
    async fn upsert(&self, record: &FeatureRecord) -> AppResult<FeatureRecord>;

    /// Insert a feature only if no row with that name exists. Returns
    /// whether a row was written.
    async fn insert_if_absent(&self, record: &FeatureRecord) -> AppResult<bool>;
}

/// Bundle of every table store, cheap to clone.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// `users`.
    pub users: Arc<dyn UserStore>,
    /// `folders`.
    pub folders: Arc<dyn FolderStore>,
    /// `files`.
    pub files: Arc<dyn FileStore>,
    /// `security_logs`.
    pub security_logs: Arc<dyn SecurityLogStore>,
    /// `login_attempts`.
    pub login_attempts: Arc<dyn LoginAttemptStore>,
    /// `plugins`.
    pub features: Arc<dyn FeatureStore>,
    pool: Option<DatabasePool>,
}

impl RecordStore {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pg.clone())),
            folders: Arc::new(FolderRepository::new(pg.clone())),
            files: Arc::new(FileRepository::new(pg.clone())),
            security_logs: Arc::new(SecurityLogRepository::new(pg.clone())),
            login_attempts: Arc::new(LoginAttemptRepository::new(pg.clone())),
            features: Arc::new(FeatureRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Process-local stores sharing one state.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        Self {
            users: store.clone(),
            folders: store.clone(),
            files: store.clone(),
            security_logs: store.clone(),
            login_attempts: store.clone(),
            features: store,
            pool: None,
        }
    }

    /// Provider name for logs and health output.
    pub fn provider_type(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Whether the backing store answers.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Close the pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
