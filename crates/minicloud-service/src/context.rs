//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use minicloud_auth::{Actor, Claims};
use minicloud_core::error::AppError;
use minicloud_database::UserStore;
use minicloud_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built from the bearer token's claims by the API layer and passed into
/// service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The username (from the token).
    pub username: String,
    /// The role at the time the token was issued.
    pub role: UserRole,
    /// The super-admin flag at the time the token was issued.
    pub is_super_admin: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, username: String, role: UserRole, is_super_admin: bool) -> Self {
        Self {
            user_id,
            username,
            role,
            is_super_admin,
            request_time: Utc::now(),
        }
    }

    /// Creates a context from decoded token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(
            claims.sub,
            claims.username.clone(),
            claims.role,
            claims.is_super_admin,
        )
    }

    /// Returns whether the token claims admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The caller as claimed by the token.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            is_super_admin: self.is_super_admin,
        }
    }

    /// The caller as currently stored. Administrative decisions use this
    /// so a role change takes effect before the caller's token expires.
    pub async fn current_actor(&self, users: &dyn UserStore) -> Result<Actor, AppError> {
        let user = users
            .find_by_id(self.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;
        Ok(Actor::from_user(&user))
    }
}
