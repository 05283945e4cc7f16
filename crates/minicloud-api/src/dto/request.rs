//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use minicloud_entity::user::UserRole;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Password, checked against the password policy by the service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Preferred language update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateLanguageRequest {
    /// Language code, e.g. `en` or `pt-BR`.
    #[validate(length(min = 2, max = 16, message = "Language must be 2-16 characters"))]
    pub language: String,
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder ID (root when absent).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Move folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveFolderRequest {
    /// Folder to move.
    pub folder_id: Uuid,
    /// New parent folder (root when absent).
    #[serde(default)]
    pub target_parent_id: Option<Uuid>,
}

/// Move file request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveFileRequest {
    /// File to move.
    pub file_id: Uuid,
    /// Destination folder (root when absent).
    #[serde(default)]
    pub target_folder_id: Option<Uuid>,
}

/// Role change request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    /// Target user.
    pub user_id: Uuid,
    /// New role.
    pub role: UserRole,
}

/// Password reset request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminPasswordRequest {
    /// Target user.
    pub user_id: Uuid,
    /// New password, checked against the password policy.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Extension blocklist replacement (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtensionBlocklistRequest {
    /// Whether uploads are checked against the list.
    pub enabled: bool,
    /// Extensions, with or without a leading dot.
    #[validate(length(max = 200, message = "At most 200 extensions may be blocked"))]
    pub extensions: Vec<String>,
}

/// Query for `GET /api/files/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Folder to list; root when absent.
    pub folder_id: Option<Uuid>,
}

/// Query for `GET /api/admin/security-logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityLogQuery {
    /// Maximum number of events to return.
    pub limit: Option<i64>,
}
