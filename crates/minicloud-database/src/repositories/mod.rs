//! PostgreSQL implementations of the record store traits.
//!
//! Structural mutations open a transaction and lock the owner's `users`
//! row first, so all writes to one owner's tree and storage counter are
//! serialized while different owners proceed in parallel.

pub mod audit;
pub mod feature;
pub mod file;
pub mod folder;
pub mod login_attempt;
pub mod user;

pub use audit::SecurityLogRepository;
pub use feature::FeatureRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use login_attempt::LoginAttemptRepository;
pub use user::UserRepository;

use sqlx::PgConnection;
use uuid::Uuid;

use minicloud_core::error::{AppError, ErrorKind};
use minicloud_core::result::AppResult;

/// Wrap a sqlx error as an internal error with context.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Internal, message, e)
}

/// Lock the owner's row for the rest of the transaction.
///
/// Returns the owner's super-admin flag. `NotFound` if the user is gone.
pub(crate) async fn lock_owner(conn: &mut PgConnection, owner_id: Uuid) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT is_super_admin FROM users WHERE id = $1 FOR UPDATE")
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to lock owner"))?
        .ok_or_else(|| AppError::not_found("User not found"))
}
