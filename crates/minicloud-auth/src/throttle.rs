//! Sliding-window login throttling.
//!
//! Counting is best effort: concurrent failures for one username may be
//! under-counted, never double-counted.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use minicloud_core::config::AuthConfig;
use minicloud_core::error::AppError;
use minicloud_database::LoginAttemptStore;

/// Rejects logins for a username with too many recent failures.
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    attempts: Arc<dyn LoginAttemptStore>,
    max_failures: i64,
    window: Duration,
}

impl LoginThrottle {
    /// Creates a throttle from auth configuration.
    pub fn new(attempts: Arc<dyn LoginAttemptStore>, config: &AuthConfig) -> Self {
        Self {
            attempts,
            max_failures: i64::from(config.login_max_failures),
            window: Duration::minutes(config.login_window_minutes_bounded()),
        }
    }

    /// Fails with `RateLimited` if `username` has reached the failure
    /// limit within the window ending at `now`.
    pub async fn check(&self, username: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let since = now - self.window;
        let failures = self.attempts.count_failures_since(username, since).await?;

        if failures >= self.max_failures {
            warn!(username = %username, failures, "Login throttled");
            return Err(AppError::rate_limited(format!(
                "Too many login attempts. Try again in {} minutes.",
                self.window.num_minutes()
            )));
        }
        Ok(())
    }

    /// Records a failed attempt at `now`.
    pub async fn record_failure(&self, username: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        self.attempts.record_failure(username, now).await
    }

    /// Drops attempts that can no longer affect any window ending at or
    /// after `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.attempts.purge_before(now - self.window).await
    }
}
