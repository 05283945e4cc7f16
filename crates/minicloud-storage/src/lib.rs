//! # minicloud-storage
//!
//! Blob store implementations for MiniCloud: a local filesystem provider
//! for deployments and an in-memory provider for tests.

pub mod manager;
pub mod providers;

pub use manager::build_blob_store;
pub use providers::{LocalBlobStore, MemoryBlobStore};
