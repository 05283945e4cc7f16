//! Admin user management: listing, role changes, password resets,
//! deletion, usage reconciliation, and the security log.
//!
//! Every operation re-reads the caller from the record store before the
//! access rules run, so a demoted admin loses these powers immediately
//! even though their token still claims the old role.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use minicloud_auth::{AccessEvaluator, AdminAction, PasswordHasher, PasswordValidator, TargetAccount};
use minicloud_core::error::AppError;
use minicloud_core::traits::storage::BlobStore;
use minicloud_database::UserStore;
use minicloud_entity::audit::{SecurityEvent, SecurityEventKind};
use minicloud_entity::user::{User, UserRole, UserWithCounts};

use crate::audit::SecurityAudit;
use crate::context::RequestContext;
use crate::storage::{StorageAccounting, UsageReconciliation};

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    users: Arc<dyn UserStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    accounting: StorageAccounting,
    access: AccessEvaluator,
    audit: SecurityAudit,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        accounting: StorageAccounting,
        audit: SecurityAudit,
    ) -> Self {
        Self {
            users,
            blobs,
            hasher,
            validator,
            accounting,
            access: AccessEvaluator::new(),
            audit,
        }
    }

    /// Checks the admin role first so non-admins never learn whether a
    /// target exists, then loads the target and applies the account rules.
    async fn authorize(
        &self,
        ctx: &RequestContext,
        action: AdminAction,
        target_id: Uuid,
    ) -> Result<User, AppError> {
        let actor = ctx.current_actor(self.users.as_ref()).await?;
        self.access.authorize_admin(&actor, action, None)?;

        let target = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        self.access
            .authorize_admin(&actor, action, Some(&TargetAccount::from(&target)))?;
        Ok(target)
    }

    async fn require_admin(&self, ctx: &RequestContext, action: AdminAction) -> Result<(), AppError> {
        let actor = ctx.current_actor(self.users.as_ref()).await?;
        self.access.authorize_admin(&actor, action, None)
    }

    /// Every account with file and folder counts.
    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<UserWithCounts>, AppError> {
        self.require_admin(ctx, AdminAction::ListUsers).await?;
        self.users.list_with_counts().await
    }

    /// Changes another account's role.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        let target = self.authorize(ctx, AdminAction::ChangeRole, user_id).await?;
        let updated = self.users.update_role(target.id, role).await?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %user_id,
            role = %role,
            "User role changed"
        );
        self.audit
            .record(
                SecurityEventKind::RoleChanged,
                Some(ctx.user_id),
                format!("Changed role of user {} to {}", target.username, role),
            )
            .await;
        Ok(updated)
    }

    /// Sets another account's password without knowing the current one.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<(), AppError> {
        let target = self
            .authorize(ctx, AdminAction::ResetPassword, user_id)
            .await?;
        self.validator.validate(new_password)?;

        let hash = self.hasher.hash_password(new_password)?;
        self.users.reset_password(target.id, &hash).await?;

        info!(admin_id = %ctx.user_id, target_id = %user_id, "User password reset by admin");
        self.audit
            .record(
                SecurityEventKind::AdminPasswordChange,
                Some(ctx.user_id),
                format!("Admin changed password for user {}", target.username),
            )
            .await;
        Ok(())
    }

    /// Deletes an account with all of its folders and files, then its
    /// blobs. A blob failure after the records are gone is logged only.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        let target = self.authorize(ctx, AdminAction::DeleteUser, user_id).await?;
        self.users.delete_cascade(target.id).await?;

        if let Err(e) = self.blobs.delete_owner(target.id).await {
            warn!(
                user_id = %target.id,
                error = %e,
                "Blobs left behind after user deletion"
            );
        }

        info!(admin_id = %ctx.user_id, target_id = %user_id, "User deleted");
        self.audit
            .record(
                SecurityEventKind::UserDeleted,
                Some(ctx.user_id),
                format!("Deleted user {}", target.username),
            )
            .await;
        Ok(())
    }

    /// Recomputes an account's storage counter from its file records.
    pub async fn reconcile_storage(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<UsageReconciliation, AppError> {
        let target = self
            .authorize(ctx, AdminAction::ReconcileStorage, user_id)
            .await?;
        let report = self.accounting.reconcile(target.id).await?;

        if report.drift() != 0 {
            self.audit
                .record(
                    SecurityEventKind::StorageReconciled,
                    Some(ctx.user_id),
                    format!(
                        "Reconciled storage of user {} from {} to {} bytes",
                        target.username, report.previous_bytes, report.current_bytes
                    ),
                )
                .await;
        }
        Ok(report)
    }

    /// Most recent security events.
    pub async fn security_events(
        &self,
        ctx: &RequestContext,
        limit: Option<i64>,
    ) -> Result<Vec<SecurityEvent>, AppError> {
        self.require_admin(ctx, AdminAction::ViewSecurityLogs).await?;
        self.audit.recent(limit).await
    }
}
