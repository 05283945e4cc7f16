//! User self-service: profile, password, usage statistics, language.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use minicloud_auth::{PasswordHasher, PasswordValidator};
use minicloud_core::error::AppError;
use minicloud_database::{FileStore, FolderStore, UserStore};
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::user::User;

use crate::audit::SecurityAudit;
use crate::context::RequestContext;

/// Self-service password change.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// The password currently set.
    pub current_password: String,
    /// The replacement, checked against the policy.
    pub new_password: String,
}

/// Usage statistics for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Bytes consumed by the caller's files.
    pub storage_used: i64,
    /// Number of files owned.
    pub file_count: i64,
    /// Number of folders owned.
    pub folder_count: i64,
}

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    audit: SecurityAudit,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        audit: SecurityAudit,
    ) -> Self {
        Self {
            users,
            folders,
            files,
            hasher,
            validator,
            audit,
        }
    }

    /// Gets the caller's current profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Changes the caller's password after re-verifying the current one.
    /// This path is open to every account, the super-admin included.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = self.get_profile(ctx).await?;

        if !self
            .hasher
            .verify_password(&req.current_password, &user.password_hash)?
        {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        self.validator.validate(&req.new_password)?;
        let hash = self.hasher.hash_password(&req.new_password)?;
        self.users.update_password(user.id, &hash).await?;

        info!(user_id = %ctx.user_id, "Password changed");
        self.audit
            .record(
                SecurityEventKind::PasswordChanged,
                Some(user.id),
                format!("User {} changed password", user.username),
            )
            .await;
        Ok(())
    }

    /// Storage used plus file and folder counts.
    pub async fn stats(&self, ctx: &RequestContext) -> Result<UserStats, AppError> {
        let user = self.get_profile(ctx).await?;
        let file_count = self.files.count_by_owner(user.id).await?;
        let folder_count = self.folders.count_by_owner(user.id).await?;
        Ok(UserStats {
            storage_used: user.storage_used,
            file_count,
            folder_count,
        })
    }

    /// Sets the preferred UI language.
    pub async fn set_language(&self, ctx: &RequestContext, language: &str) -> Result<User, AppError> {
        let language = normalize_language(language)?;
        let user = self.users.update_language(ctx.user_id, &language).await?;
        info!(user_id = %ctx.user_id, language = %language, "Language updated");
        Ok(user)
    }
}

/// Language tags are 2-16 characters of ASCII letters, digits, or `-`.
fn normalize_language(raw: &str) -> Result<String, AppError> {
    let tag = raw.trim();
    let valid = (2..=16).contains(&tag.len())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(AppError::invalid_input(format!(
            "Invalid language code: '{tag}'"
        )));
    }
    Ok(tag.to_string())
}
