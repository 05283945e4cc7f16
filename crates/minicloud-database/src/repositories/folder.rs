//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::result::AppResult;
use minicloud_entity::folder::{CreateFolder, Folder, FolderGraph};

use super::{db_error, lock_owner};
use crate::store::FolderStore;

/// PostgreSQL `folders` table.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The owner's folders as seen inside the current transaction.
async fn owner_graph(conn: &mut PgConnection, owner_id: Uuid) -> AppResult<FolderGraph> {
    let folders = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to load folder tree"))?;
    Ok(FolderGraph::new(folders))
}

fn map_sibling_clash(e: sqlx::Error, name: &str, fallback: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("folders_sibling_name_key") =>
        {
            AppError::conflict(format!("A folder named '{name}' already exists in this location"))
        }
        _ => db_error(fallback)(e),
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder"))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = $1 ORDER BY name ASC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list folders"))
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count folders"))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, data.owner_id).await?;
        owner_graph(&mut tx, data.owner_id)
            .await?
            .check_create(data.parent_id, &data.name)?;

        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, owner_id, parent_id, name) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sibling_clash(e, &data.name, "Failed to create folder"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(folder)
    }

    async fn move_to(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, owner_id).await?;
        let graph = owner_graph(&mut tx, owner_id).await?;
        let name = graph.check_move(folder_id, new_parent)?.name.clone();

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $3 WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(new_parent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sibling_clash(e, &name, "Failed to move folder"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(folder)
    }

    async fn delete_if_empty(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, owner_id).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM folders WHERE id = $1 AND owner_id = $2)",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to find folder"))?;
        if !exists {
            return Err(AppError::not_found("Folder not found"));
        }

        let (children, files): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM folders WHERE parent_id = $1), \
                    (SELECT COUNT(*) FROM files WHERE folder_id = $1)",
        )
        .bind(folder_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count folder contents"))?;
        if children > 0 || files > 0 {
            return Err(AppError::not_empty(
                "Folder is not empty. Delete its files and subfolders first",
            ));
        }

        sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(folder_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folder"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }
}
