//! File repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::result::AppResult;
use minicloud_entity::file::{CreateFile, File};

use super::{db_error, lock_owner};
use crate::store::FileStore;

/// PostgreSQL `files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `NotFound` unless `folder_id` is root or one of the owner's folders.
async fn ensure_owned_folder(
    conn: &mut PgConnection,
    owner_id: Uuid,
    folder_id: Option<Uuid>,
) -> AppResult<()> {
    let Some(folder_id) = folder_id else {
        return Ok(());
    };
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM folders WHERE id = $1 AND owner_id = $2)",
    )
    .bind(folder_id)
    .bind(owner_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("Failed to find folder"))?;
    if exists {
        Ok(())
    } else {
        Err(AppError::not_found("Folder not found"))
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find file"))
    }

    async fn list_in_folder(&self, owner_id: Uuid, folder_id: Option<Uuid>) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC, created_at ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list files"))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list files"))
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count files"))
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, data.owner_id).await?;
        ensure_owned_folder(&mut tx, data.owner_id, data.folder_id).await?;

        let file = sqlx::query_as::<_, File>(
            "INSERT INTO files (id, owner_id, folder_id, name, size_bytes, content_type, blob_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.id)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(data.size_bytes)
        .bind(&data.content_type)
        .bind(data.blob_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("files_pkey") => {
                AppError::conflict("File already exists")
            }
            _ => db_error("Failed to create file record")(e),
        })?;

        sqlx::query(
            "UPDATE users SET storage_used = storage_used + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(data.owner_id)
        .bind(data.size_bytes)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to credit storage usage"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(file)
    }

    async fn move_to(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<File> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, owner_id).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM files WHERE id = $1 AND owner_id = $2)",
        )
        .bind(file_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to find file"))?;
        if !exists {
            return Err(AppError::not_found("File not found"));
        }
        ensure_owned_folder(&mut tx, owner_id, folder_id)
            .await
            .map_err(|e| {
                if e.kind == minicloud_core::ErrorKind::NotFound {
                    AppError::not_found("Target folder not found")
                } else {
                    e
                }
            })?;

        let file = sqlx::query_as::<_, File>(
            "UPDATE files SET folder_id = $3 WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(file_id)
        .bind(owner_id)
        .bind(folder_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to move file"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(file)
    }

    async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<File> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, owner_id).await?;

        let file = sqlx::query_as::<_, File>(
            "DELETE FROM files WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(file_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to delete file record"))?
        .ok_or_else(|| AppError::not_found("File not found"))?;

        sqlx::query(
            "UPDATE users SET storage_used = GREATEST(storage_used - $2, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(owner_id)
        .bind(file.size_bytes)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to debit storage usage"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(file)
    }
}
