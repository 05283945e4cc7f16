//! User domain entities.

pub mod model;
pub mod role;

pub use model::{CreateUser, DEFAULT_LANGUAGE, User, UserWithCounts};
pub use role::UserRole;
