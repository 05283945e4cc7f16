//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role.
    pub role: UserRole,
    /// Set on the single bootstrap account only.
    pub is_super_admin: bool,
    /// Bytes currently consumed by the user's files.
    pub storage_used: i64,
    /// Preferred UI language code.
    pub language: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A user with the number of files and folders they own.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserWithCounts {
    /// The user record.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub user: User,
    /// Files owned.
    pub file_count: i64,
    /// Folders owned.
    pub folder_count: i64,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Whether this is the bootstrap super-admin.
    pub is_super_admin: bool,
}

impl CreateUser {
    /// A regular self-registered account.
    pub fn regular(username: impl Into<String>, email: impl Into<String>, hash: String) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash,
            role: UserRole::User,
            is_super_admin: false,
        }
    }
}

/// Default language for new accounts.
pub const DEFAULT_LANGUAGE: &str = "en";
