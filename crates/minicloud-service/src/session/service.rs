//! Account registration and credential login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use minicloud_auth::{JwtEncoder, LoginThrottle, PasswordHasher, PasswordValidator};
use minicloud_core::error::AppError;
use minicloud_database::UserStore;
use minicloud_entity::audit::SecurityEventKind;
use minicloud_entity::user::{CreateUser, User};

use crate::audit::SecurityAudit;

/// New account data.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Unique login name.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// Plaintext password, checked against the policy.
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login name exactly as registered.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// The authenticated account.
    pub user: User,
}

/// Registers accounts and exchanges credentials for tokens.
#[derive(Debug, Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
    throttle: LoginThrottle,
    audit: SecurityAudit,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        throttle: LoginThrottle,
        audit: SecurityAudit,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
            throttle,
            audit,
        }
    }

    /// Creates a regular account.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let username = req.username.trim();
        let email = req.email.trim();
        if username.is_empty() {
            return Err(AppError::invalid_input("Username is required"));
        }
        if email.is_empty() {
            return Err(AppError::invalid_input("Email is required"));
        }
        self.validator.validate(&req.password)?;

        let hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .users
            .create(&CreateUser::regular(username, email, hash))
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.audit
            .record(
                SecurityEventKind::UserRegistered,
                Some(user.id),
                format!("User {} registered", user.username),
            )
            .await;
        Ok(user)
    }

    /// Verifies credentials and issues a token.
    ///
    /// Every failure, unknown username included, counts against the
    /// username's sliding window; once the window is full even correct
    /// credentials are refused.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let now = Utc::now();
        self.throttle.check(&req.username, now).await?;

        let user = match self.users.find_by_username(&req.username).await? {
            Some(user) if self.hasher.verify_password(&req.password, &user.password_hash)? => user,
            _ => {
                self.throttle.record_failure(&req.username, now).await?;
                warn!(username = %req.username, "Failed login attempt");
                return Err(AppError::unauthorized("Invalid username or password"));
            }
        };

        let issued = self.encoder.issue(&user, now)?;

        if let Err(e) = self.throttle.purge_expired(now).await {
            warn!(error = %e, "Failed to purge expired login attempts");
        }

        info!(user_id = %user.id, "User logged in");
        self.audit
            .record(
                SecurityEventKind::UserLogin,
                Some(user.id),
                format!("User {} logged in", user.username),
            )
            .await;

        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.claims.expires_at(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use minicloud_core::ErrorKind;

    use super::*;
    use crate::testing::{Harness, PASSWORD};

    fn register(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: PASSWORD.into(),
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let h = Harness::new().await;
        h.sessions.register(register("alice", "a@example.com")).await.unwrap();

        let err = h
            .sessions
            .register(register("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = h
            .sessions
            .register(register("alicia", "a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn weak_password_names_the_rule() {
        let h = Harness::new().await;
        let mut req = register("alice", "a@example.com");
        req.password = "alllowercase!".into();

        let err = h.sessions.register(req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(err.message.contains("uppercase"));
    }

    #[tokio::test]
    async fn login_issues_token_for_registered_user() {
        let h = Harness::new().await;
        let user = h.sessions.register(register("alice", "a@example.com")).await.unwrap();

        let resp = h.sessions.login(login("alice", PASSWORD)).await.unwrap();
        let claims = h.decoder.decode(&resp.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(resp.expires_at > Utc::now() + chrono::Duration::hours(23));
    }

    #[tokio::test]
    async fn sixth_attempt_is_throttled_even_with_right_password() {
        let h = Harness::new().await;
        h.sessions.register(register("alice", "a@example.com")).await.unwrap();

        for _ in 0..5 {
            let err = h.sessions.login(login("alice", "Wrong!pass")).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Unauthorized);
        }

        let err = h.sessions.login(login("alice", PASSWORD)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let h = Harness::new().await;
        let err = h.sessions.login(login("ghost", PASSWORD)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
