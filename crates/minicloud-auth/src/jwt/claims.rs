//! JWT claims carried by every bearer token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use minicloud_entity::user::{User, UserRole};

/// Claims payload. Tokens are not revocable and stay valid until `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Username at issuance.
    pub username: String,
    /// Role at issuance.
    pub role: UserRole,
    /// Super-admin flag at issuance.
    pub is_super_admin: bool,
    /// Issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Build claims for `user` valid from `now` for `ttl`.
    pub fn for_user(
        user: &User,
        issuer: &str,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            is_super_admin: user.is_super_admin,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Whether the token claims admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
