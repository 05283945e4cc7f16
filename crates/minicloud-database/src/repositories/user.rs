//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_core::result::AppResult;
use minicloud_entity::user::{CreateUser, User, UserRole, UserWithCounts};

use super::{db_error, lock_owner};
use crate::store::UserStore;

/// PostgreSQL `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tell "missing" from "protected" after a conditional update hit no row.
    async fn explain_miss(&self, id: Uuid) -> AppError {
        match UserStore::find_by_id(self, id).await {
            Ok(Some(user)) if user.is_super_admin => {
                AppError::forbidden("The super admin account cannot be modified")
            }
            Ok(_) => AppError::not_found("User not found"),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    async fn find_super_admin(&self) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_super_admin")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find super admin"))
    }

    async fn list_with_counts(&self) -> AppResult<Vec<UserWithCounts>> {
        sqlx::query_as::<_, UserWithCounts>(
            "SELECT u.*, \
                (SELECT COUNT(*) FROM files f WHERE f.owner_id = u.id) AS file_count, \
                (SELECT COUNT(*) FROM folders d WHERE d.owner_id = u.id) AS folder_count \
             FROM users u ORDER BY u.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, role, is_super_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.is_super_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict("Username already exists")
            }
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict("Email already exists")
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_single_super_admin_key") =>
            {
                AppError::conflict("A super admin already exists")
            }
            _ => db_error("Failed to create user")(e),
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to update password"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    async fn reset_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND NOT is_super_admin",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to reset password"))?;
        if result.rows_affected() == 0 {
            return Err(self.explain_miss(id).await);
        }
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() \
             WHERE id = $1 AND NOT is_super_admin RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update role"))?;
        match updated {
            Some(user) => Ok(user),
            None => Err(self.explain_miss(id).await),
        }
    }

    async fn update_language(&self, id: Uuid, language: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET language = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update language"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn adjust_storage(&self, id: Uuid, delta: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET storage_used = GREATEST(storage_used + $2, 0), updated_at = NOW() \
             WHERE id = $1 RETURNING storage_used",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to adjust storage usage"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn recompute_storage(&self, id: Uuid) -> AppResult<(i64, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        lock_owner(&mut tx, id).await?;

        let previous: i64 = sqlx::query_scalar("SELECT storage_used FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to read storage usage"))?;
        let current: i64 = sqlx::query_scalar(
            "UPDATE users SET storage_used = \
                (SELECT COALESCE(SUM(size_bytes), 0)::BIGINT FROM files WHERE owner_id = $1), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING storage_used",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to recompute storage usage"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok((previous, current))
    }

    async fn delete_cascade(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        if lock_owner(&mut tx, id).await? {
            return Err(AppError::forbidden("The super admin account cannot be deleted"));
        }

        sqlx::query("DELETE FROM files WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete user files"))?;
        sqlx::query("DELETE FROM folders WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete user folders"))?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete user"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }
}
