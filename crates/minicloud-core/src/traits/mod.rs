//! Trait definitions implemented by downstream crates.

pub mod storage;

pub use storage::{BlobStore, ByteStream};
