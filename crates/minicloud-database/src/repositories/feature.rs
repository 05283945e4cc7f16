//! Feature settings repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use minicloud_core::result::AppResult;
use minicloud_entity::feature::FeatureRecord;

use super::db_error;
use crate::store::FeatureStore;

/// PostgreSQL `plugins` table.
#[derive(Debug, Clone)]
pub struct FeatureRepository {
    pool: PgPool,
}

impl FeatureRepository {
    /// Create a new feature repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeatureStore for FeatureRepository {
    async fn get(&self, name: &str) -> AppResult<Option<FeatureRecord>> {
        sqlx::query_as::<_, FeatureRecord>("SELECT * FROM plugins WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load feature setting"))
    }

    async fn upsert(&self, record: &FeatureRecord) -> AppResult<FeatureRecord> {
        sqlx::query_as::<_, FeatureRecord>(
            "INSERT INTO plugins (name, enabled, settings, updated_at) VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (name) DO UPDATE \
             SET enabled = EXCLUDED.enabled, settings = EXCLUDED.settings, updated_at = NOW() \
             RETURNING *",
        )
        .bind(&record.name)
        .bind(record.enabled)
        .bind(&record.settings)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to save feature setting"))
    }

    async fn insert_if_absent(&self, record: &FeatureRecord) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO plugins (name, enabled, settings) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&record.name)
        .bind(record.enabled)
        .bind(&record.settings)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to seed feature setting"))?;
        Ok(result.rows_affected() == 1)
    }
}
