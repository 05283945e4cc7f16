//! Security event and login attempt models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kinds of security events written to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    /// A new account was registered.
    UserRegistered,
    /// A successful login.
    UserLogin,
    /// A user changed their own password.
    PasswordChanged,
    /// A file was uploaded.
    FileUploaded,
    /// A file was downloaded.
    FileDownloaded,
    /// A file was deleted.
    FileDeleted,
    /// An admin changed a user's role.
    RoleChanged,
    /// An admin deleted a user.
    UserDeleted,
    /// An admin reset a user's password.
    AdminPasswordChange,
    /// An admin changed a feature setting.
    FeatureUpdated,
    /// An admin reconciled a user's storage counter.
    StorageReconciled,
}

impl SecurityEventKind {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::UserLogin => "user_login",
            Self::PasswordChanged => "password_changed",
            Self::FileUploaded => "file_uploaded",
            Self::FileDownloaded => "file_downloaded",
            Self::FileDeleted => "file_deleted",
            Self::RoleChanged => "role_changed",
            Self::UserDeleted => "user_deleted",
            Self::AdminPasswordChange => "admin_password_change",
            Self::FeatureUpdated => "feature_updated",
            Self::StorageReconciled => "storage_reconciled",
        }
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityEventKind {
    type Err = minicloud_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "user_registered" => Self::UserRegistered,
            "user_login" => Self::UserLogin,
            "password_changed" => Self::PasswordChanged,
            "file_uploaded" => Self::FileUploaded,
            "file_downloaded" => Self::FileDownloaded,
            "file_deleted" => Self::FileDeleted,
            "role_changed" => Self::RoleChanged,
            "user_deleted" => Self::UserDeleted,
            "admin_password_change" => Self::AdminPasswordChange,
            "feature_updated" => Self::FeatureUpdated,
            "storage_reconciled" => Self::StorageReconciled,
            other => {
                return Err(minicloud_core::AppError::invalid_input(format!(
                    "Unknown security event kind: '{other}'"
                )));
            }
        };
        Ok(kind)
    }
}

/// An immutable security ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityEvent {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Stored event kind (see [`SecurityEventKind::as_str`]).
    pub event_type: String,
    /// The acting user.
    pub user_id: Option<Uuid>,
    /// Free-text detail.
    pub details: String,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a security event.
#[derive(Debug, Clone)]
pub struct NewSecurityEvent {
    /// Event kind.
    pub kind: SecurityEventKind,
    /// The acting user.
    pub user_id: Option<Uuid>,
    /// Free-text detail.
    pub details: String,
}

/// One login attempt, kept to compute the sliding failure window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// Username as submitted.
    pub username: String,
    /// When the attempt failed.
    pub attempted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            SecurityEventKind::UserRegistered,
            SecurityEventKind::AdminPasswordChange,
            SecurityEventKind::StorageReconciled,
        ] {
            assert_eq!(kind.as_str().parse::<SecurityEventKind>().unwrap(), kind);
        }
        assert!("file_shared".parse::<SecurityEventKind>().is_err());
    }
}
