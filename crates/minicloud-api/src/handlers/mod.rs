//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod file;
pub mod folder;
pub mod health;
pub mod user;
