//! Security log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use minicloud_core::result::AppResult;
use minicloud_entity::audit::{NewSecurityEvent, SecurityEvent};

use super::db_error;
use crate::store::SecurityLogStore;

/// PostgreSQL `security_logs` table. Rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct SecurityLogRepository {
    pool: PgPool,
}

impl SecurityLogRepository {
    /// Create a new security log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityLogStore for SecurityLogRepository {
    async fn append(&self, event: &NewSecurityEvent) -> AppResult<SecurityEvent> {
        sqlx::query_as::<_, SecurityEvent>(
            "INSERT INTO security_logs (id, event_type, user_id, details) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(event.kind.as_str())
        .bind(event.user_id)
        .bind(&event.details)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to append security event"))
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<SecurityEvent>> {
        sqlx::query_as::<_, SecurityEvent>(
            "SELECT * FROM security_logs ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list security events"))
    }
}
