//! Ownership and administrative access rules.

use std::fmt;

use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_entity::user::{User, UserRole};

use crate::jwt::Claims;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller's user ID.
    pub user_id: Uuid,
    /// Caller's role.
    pub role: UserRole,
    /// Whether the caller is the super-admin.
    pub is_super_admin: bool,
}

impl Actor {
    /// Actor as stated by token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            is_super_admin: claims.is_super_admin,
        }
    }

    /// Actor as currently stored.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            is_super_admin: user.is_super_admin,
        }
    }
}

/// The account an administrative action is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetAccount {
    /// Target user ID.
    pub user_id: Uuid,
    /// Target role.
    pub role: UserRole,
    /// Whether the target is the super-admin.
    pub is_super_admin: bool,
}

impl From<&User> for TargetAccount {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            is_super_admin: user.is_super_admin,
        }
    }
}

/// Actions reserved to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    /// List every account.
    ListUsers,
    /// Read the security log.
    ViewSecurityLogs,
    /// Read or replace feature settings.
    ManageFeatures,
    /// Recompute an account's storage counter.
    ReconcileStorage,
    /// Change an account's role.
    ChangeRole,
    /// Set an account's password without the current one.
    ResetPassword,
    /// Delete an account and everything it owns.
    DeleteUser,
}

impl AdminAction {
    /// Whether the action changes or removes the target account.
    pub fn modifies_account(&self) -> bool {
        matches!(self, Self::ChangeRole | Self::ResetPassword | Self::DeleteUser)
    }

    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListUsers => "list_users",
            Self::ViewSecurityLogs => "view_security_logs",
            Self::ManageFeatures => "manage_features",
            Self::ReconcileStorage => "reconcile_storage",
            Self::ChangeRole => "change_role",
            Self::ResetPassword => "reset_password",
            Self::DeleteUser => "delete_user",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a caller may act on a resource or account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessEvaluator;

impl AccessEvaluator {
    /// Creates an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Any caller may act on what they own. Anything else is reported as
    /// absent so other users' resources stay invisible.
    pub fn check_ownership(
        &self,
        actor: &Actor,
        owner_id: Uuid,
        resource: &str,
    ) -> Result<(), AppError> {
        if actor.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::not_found(format!("{resource} not found")))
        }
    }

    /// Applies the administrative rules in order: admin role required,
    /// only the super-admin touches other admins, nobody touches the
    /// super-admin, nobody deletes themselves here.
    pub fn authorize_admin(
        &self,
        actor: &Actor,
        action: AdminAction,
        target: Option<&TargetAccount>,
    ) -> Result<(), AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }

        let Some(target) = target else {
            return Ok(());
        };
        if !action.modifies_account() {
            return Ok(());
        }

        let is_self = target.user_id == actor.user_id;

        if !actor.is_super_admin && target.role.is_admin() && !is_self {
            return Err(AppError::forbidden(
                "Only the super admin can modify other admin users",
            ));
        }

        if target.is_super_admin {
            return Err(AppError::forbidden("The super admin account cannot be modified"));
        }

        if action == AdminAction::DeleteUser && is_self {
            return Err(AppError::invalid_operation("Cannot delete yourself"));
        }

        Ok(())
    }
}
