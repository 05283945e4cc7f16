//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use minicloud_entity::file::File;
use minicloud_entity::user::{User, UserRole, UserWithCounts};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserResponse,
}

/// User profile for responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_super_admin: bool,
    pub storage_used: i64,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_super_admin: user.is_super_admin,
            storage_used: user.storage_used,
            language: user.language,
            created_at: user.created_at,
        }
    }
}

/// Row of the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub file_count: i64,
    pub folder_count: i64,
}

impl From<UserWithCounts> for AdminUserResponse {
    fn from(row: UserWithCounts) -> Self {
        Self {
            user: row.user.into(),
            file_count: row.file_count,
            folder_count: row.folder_count,
        }
    }
}

/// File metadata for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
    pub folder_id: Option<Uuid>,
    pub size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            name: file.name,
            folder_id: file.folder_id,
            size: file.size_bytes,
            mime_type: file.content_type,
            created_at: file.created_at,
        }
    }
}

/// Subtree size of one folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSizeResponse {
    pub folder_id: Uuid,
    pub size: i64,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every backend answers, `degraded` otherwise.
    pub status: String,
    /// Version.
    pub version: String,
    /// Record store provider and reachability.
    pub database: ComponentHealth,
    /// Blob store provider and reachability.
    pub storage: ComponentHealth,
}

/// Reachability of one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub provider: String,
    pub healthy: bool,
}
