//! JWT token creation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use minicloud_core::config::AuthConfig;
use minicloud_core::error::AppError;
use minicloud_entity::user::User;

use super::claims::Claims;

/// A signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// Decoded claims.
    pub claims: Claims,
}

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    issuer: String,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            ttl: chrono::Duration::hours(config.token_ttl_hours_bounded()),
        }
    }

    /// Issues a token for `user` starting at `now`.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let claims = Claims::for_user(user, &self.issuer, now, self.ttl);
        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Encodes arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
