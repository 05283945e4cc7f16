//! Login attempt repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use minicloud_core::result::AppResult;

use super::db_error;
use crate::store::LoginAttemptStore;

/// PostgreSQL `login_attempts` table.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginAttemptStore for LoginAttemptRepository {
    async fn record_failure(&self, username: &str, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("INSERT INTO login_attempts (id, username, attempted_at) VALUES ($1, $2, $3)")
            .bind(Uuid::now_v7())
            .bind(username)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to record login attempt"))?;
        Ok(())
    }

    async fn count_failures_since(&self, username: &str, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_attempts WHERE username = $1 AND attempted_at >= $2",
        )
        .bind(username)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count login attempts"))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to purge login attempts"))?;
        Ok(result.rows_affected())
    }
}
