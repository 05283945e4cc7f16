//! All tables in process memory behind one lock.
//!
//! Every trait method takes the lock once, so each call observes and
//! mutates a single consistent state. This gives the same atomicity as the
//! PostgreSQL transactions, at the cost of serializing all writers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::result::AppResult;
use minicloud_entity::audit::{LoginAttempt, NewSecurityEvent, SecurityEvent};
use minicloud_entity::feature::FeatureRecord;
use minicloud_entity::file::{CreateFile, File};
use minicloud_entity::folder::{CreateFolder, Folder, FolderGraph};
use minicloud_entity::user::{CreateUser, DEFAULT_LANGUAGE, User, UserRole, UserWithCounts};

use crate::store::{
    FeatureStore, FileStore, FolderStore, LoginAttemptStore, SecurityLogStore, UserStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
    security_logs: Vec<SecurityEvent>,
    login_attempts: Vec<LoginAttempt>,
    features: HashMap<String, FeatureRecord>,
}

impl MemoryState {
    fn owner_folders(&self, owner_id: Uuid) -> impl Iterator<Item = &Folder> {
        self.folders.values().filter(move |f| f.owner_id == owner_id)
    }

    fn owner_files(&self, owner_id: Uuid) -> impl Iterator<Item = &File> {
        self.files.values().filter(move |f| f.owner_id == owner_id)
    }

    fn graph(&self, owner_id: Uuid) -> FolderGraph {
        FolderGraph::new(self.owner_folders(owner_id).cloned())
    }

    fn graph_with_files(&self, owner_id: Uuid) -> FolderGraph {
        self.graph(owner_id).with_files(self.owner_files(owner_id))
    }

    fn owns_folder(&self, owner_id: Uuid, folder_id: Option<Uuid>) -> bool {
        match folder_id {
            None => true,
            Some(id) => self.folders.get(&id).is_some_and(|f| f.owner_id == owner_id),
        }
    }

    fn user_mut(&mut self, id: Uuid) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    fn adjust_storage(&mut self, id: Uuid, delta: i64) -> AppResult<i64> {
        let user = self.user_mut(id)?;
        user.storage_used = user.storage_used.saturating_add(delta).max(0);
        user.updated_at = Utc::now();
        Ok(user.storage_used)
    }
}

/// Record store holding every table in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn super_admin_forbidden() -> AppError {
    AppError::forbidden("The super admin account cannot be modified")
}

#[async_trait]
impl UserStore for MemoryRecordStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_super_admin(&self) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.is_super_admin).cloned())
    }

    async fn list_with_counts(&self) -> AppResult<Vec<UserWithCounts>> {
        let state = self.state.lock().await;
        let mut users: Vec<UserWithCounts> = state
            .users
            .values()
            .map(|user| UserWithCounts {
                file_count: state.owner_files(user.id).count() as i64,
                folder_count: state.owner_folders(user.id).count() as i64,
                user: user.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.user.created_at.cmp(&b.user.created_at));
        Ok(users)
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        for existing in state.users.values() {
            if existing.username == data.username {
                return Err(AppError::conflict("Username already exists"));
            }
            if existing.email == data.email {
                return Err(AppError::conflict("Email already exists"));
            }
            if data.is_super_admin && existing.is_super_admin {
                return Err(AppError::conflict("A super admin already exists"));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            is_super_admin: data.is_super_admin,
            storage_used: 0,
            language: DEFAULT_LANGUAGE.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        if user.is_super_admin {
            return Err(super_admin_forbidden());
        }
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        if user.is_super_admin {
            return Err(super_admin_forbidden());
        }
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_language(&self, id: Uuid, language: &str) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        user.language = language.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn adjust_storage(&self, id: Uuid, delta: i64) -> AppResult<i64> {
        self.state.lock().await.adjust_storage(id, delta)
    }

    async fn recompute_storage(&self, id: Uuid) -> AppResult<(i64, i64)> {
        let mut state = self.state.lock().await;
        let actual: i64 = state.owner_files(id).map(|f| f.size_bytes).sum();
        let user = state.user_mut(id)?;
        let previous = user.storage_used;
        user.storage_used = actual;
        user.updated_at = Utc::now();
        Ok((previous, actual))
    }

    async fn delete_cascade(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.is_super_admin {
            return Err(AppError::forbidden("The super admin account cannot be deleted"));
        }
        state.files.retain(|_, f| f.owner_id != id);
        state.folders.retain(|_, f| f.owner_id != id);
        state.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl FolderStore for MemoryRecordStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.lock().await.folders.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        let mut folders: Vec<Folder> = state.owner_folders(owner_id).cloned().collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        Ok(self.state.lock().await.owner_folders(owner_id).count() as i64)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&data.owner_id) {
            return Err(AppError::not_found("User not found"));
        }
        state
            .graph(data.owner_id)
            .check_create(data.parent_id, &data.name)?;

        let folder = Folder {
            id: Uuid::now_v7(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            created_at: Utc::now(),
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn move_to(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut state = self.state.lock().await;
        state.graph(owner_id).check_move(folder_id, new_parent)?;

        let folder = state
            .folders
            .get_mut(&folder_id)
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        folder.parent_id = new_parent;
        Ok(folder.clone())
    }

    async fn delete_if_empty(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.graph_with_files(owner_id).check_delete(folder_id)?;
        state.folders.remove(&folder_id);
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryRecordStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.state.lock().await.files.get(&id).cloned())
    }

    async fn list_in_folder(&self, owner_id: Uuid, folder_id: Option<Uuid>) -> AppResult<Vec<File>> {
        let state = self.state.lock().await;
        let mut files: Vec<File> = state
            .owner_files(owner_id)
            .filter(|f| f.folder_id == folder_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(files)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        let state = self.state.lock().await;
        Ok(state.owner_files(owner_id).cloned().collect())
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        Ok(self.state.lock().await.owner_files(owner_id).count() as i64)
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&data.owner_id) {
            return Err(AppError::not_found("User not found"));
        }
        if !state.owns_folder(data.owner_id, data.folder_id) {
            return Err(AppError::not_found("Folder not found"));
        }
        if state.files.contains_key(&data.id) {
            return Err(AppError::conflict("File already exists"));
        }

        let file = File {
            id: data.id,
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            size_bytes: data.size_bytes,
            content_type: data.content_type.clone(),
            blob_id: data.blob_id,
            created_at: Utc::now(),
        };
        state.files.insert(file.id, file.clone());
        state.adjust_storage(data.owner_id, data.size_bytes)?;
        Ok(file)
    }

    async fn move_to(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<File> {
        let mut state = self.state.lock().await;
        let owned = state
            .files
            .get(&file_id)
            .is_some_and(|f| f.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("File not found"));
        }
        if !state.owns_folder(owner_id, folder_id) {
            return Err(AppError::not_found("Target folder not found"));
        }

        let file = state
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        file.folder_id = folder_id;
        Ok(file.clone())
    }

    async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let mut state = self.state.lock().await;
        let owned = state
            .files
            .get(&file_id)
            .is_some_and(|f| f.owner_id == owner_id);
        if !owned {
            return Err(AppError::not_found("File not found"));
        }
        let file = state
            .files
            .remove(&file_id)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        state.adjust_storage(owner_id, -file.size_bytes)?;
        Ok(file)
    }
}

#[async_trait]
impl SecurityLogStore for MemoryRecordStore {
    async fn append(&self, event: &NewSecurityEvent) -> AppResult<SecurityEvent> {
        let entry = SecurityEvent {
            id: Uuid::now_v7(),
            event_type: event.kind.as_str().to_string(),
            user_id: event.user_id,
            details: event.details.clone(),
            created_at: Utc::now(),
        };
        self.state.lock().await.security_logs.push(entry.clone());
        Ok(entry)
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<SecurityEvent>> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(state
            .security_logs
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LoginAttemptStore for MemoryRecordStore {
    async fn record_failure(&self, username: &str, at: DateTime<Utc>) -> AppResult<()> {
        self.state.lock().await.login_attempts.push(LoginAttempt {
            id: Uuid::now_v7(),
            username: username.to_string(),
            attempted_at: at,
        });
        Ok(())
    }

    async fn count_failures_since(&self, username: &str, since: DateTime<Utc>) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .login_attempts
            .iter()
            .filter(|a| a.username == username && a.attempted_at >= since)
            .count() as i64)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.login_attempts.len();
        state.login_attempts.retain(|a| a.attempted_at >= cutoff);
        Ok((before - state.login_attempts.len()) as u64)
    }
}

#[async_trait]
impl FeatureStore for MemoryRecordStore {
    async fn get(&self, name: &str) -> AppResult<Option<FeatureRecord>> {
        Ok(self.state.lock().await.features.get(name).cloned())
    }

    async fn upsert(&self, record: &FeatureRecord) -> AppResult<FeatureRecord> {
        let mut stored = record.clone();
        stored.updated_at = Utc::now();
        self.state
            .lock()
            .await
            .features
            .insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn insert_if_absent(&self, record: &FeatureRecord) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.features.contains_key(&record.name) {
            return Ok(false);
        }
        state.features.insert(record.name.clone(), record.clone());
        Ok(true)
    }
}
