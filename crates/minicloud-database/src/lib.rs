//! # minicloud-database
//!
//! Record store for MiniCloud: one trait per table, a PostgreSQL
//! implementation of each, and an in-memory implementation used by tests
//! and single-process deployments.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryRecordStore;
pub use store::{
    FeatureStore, FileStore, FolderStore, LoginAttemptStore, RecordStore, SecurityLogStore,
    UserStore,
};
