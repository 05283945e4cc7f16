//! Convenience result type alias for MiniCloud.

use crate::error::AppError;

/// A specialized `Result` type for MiniCloud operations.
pub type AppResult<T> = Result<T, AppError>;
