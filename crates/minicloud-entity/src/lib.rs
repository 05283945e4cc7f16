//! # minicloud-entity
//!
//! Domain entity models for MiniCloud. Every struct in this crate
//! represents a record store row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and table rows
//! additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod feature;
pub mod file;
pub mod folder;
pub mod user;
