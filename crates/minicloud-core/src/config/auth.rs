//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted login throttling window: one week.
pub const MAX_LOGIN_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 365 * 24;

/// Authentication, login throttling, and first-boot account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// How long an issued token stays valid.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Failed attempts tolerated inside the sliding window.
    #[serde(default = "default_max_failures")]
    pub login_max_failures: u32,
    /// Length of the sliding login window.
    #[serde(default = "default_login_window")]
    pub login_window_minutes: u64,
    /// Username of the super-admin created at first boot.
    #[serde(default = "default_admin_username")]
    pub bootstrap_admin_username: String,
    /// Email of the super-admin created at first boot.
    #[serde(default = "default_admin_email")]
    pub bootstrap_admin_email: String,
    /// Password of the super-admin; a random one is generated when empty.
    #[serde(default)]
    pub bootstrap_admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            token_ttl_hours: default_token_ttl(),
            login_max_failures: default_max_failures(),
            login_window_minutes: default_login_window(),
            bootstrap_admin_username: default_admin_username(),
            bootstrap_admin_email: default_admin_email(),
            bootstrap_admin_password: String::new(),
        }
    }
}

impl AuthConfig {
    /// `login_window_minutes` clamped to `1..=MAX_LOGIN_WINDOW_MINUTES`.
    pub fn login_window_minutes_bounded(&self) -> i64 {
        bounded(self.login_window_minutes, MAX_LOGIN_WINDOW_MINUTES)
    }

    /// `token_ttl_hours` clamped to `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn token_ttl_hours_bounded(&self) -> i64 {
        bounded(self.token_ttl_hours, MAX_TOKEN_TTL_HOURS)
    }
}

fn bounded(value: u64, max: i64) -> i64 {
    i64::try_from(value).map_or(max, |v| v.clamp(1, max))
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "minicloud".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_max_failures() -> u32 {
    5
}

fn default_login_window() -> u64 {
    15
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@minicloud.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_durations() {
        let mut config = AuthConfig::default();
        assert_eq!(config.login_window_minutes_bounded(), 15);
        assert_eq!(config.token_ttl_hours_bounded(), 24);

        config.login_window_minutes = u64::MAX;
        config.token_ttl_hours = 0;
        assert_eq!(config.login_window_minutes_bounded(), MAX_LOGIN_WINDOW_MINUTES);
        assert_eq!(config.token_ttl_hours_bounded(), 1);
    }
}
