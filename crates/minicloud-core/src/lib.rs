//! # minicloud-core
//!
//! Core crate for MiniCloud. Contains the blob store trait, configuration
//! schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MiniCloud crates.

pub mod config;
pub mod error;
pub mod http;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
