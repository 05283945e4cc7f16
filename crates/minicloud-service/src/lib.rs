//! # minicloud-service
//!
//! Business logic service layer for MiniCloud. Each service orchestrates
//! the record store, the blob store, and the auth primitives to implement
//! one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod bootstrap;
pub mod context;
pub mod feature;
pub mod file;
pub mod folder;
pub mod session;
pub mod storage;
pub mod user;

#[cfg(test)]
mod testing;



pub use audit::SecurityAudit;
pub use bootstrap::{BootstrapReport, bootstrap};
pub use context::RequestContext;
pub use feature::FeatureService;
pub use file::{DownloadService, FileService, UploadService};
pub use folder::{FolderService, TreeService};
pub use session::SessionService;
pub use storage::StorageAccounting;
pub use user::{AdminUserService, UserService};
