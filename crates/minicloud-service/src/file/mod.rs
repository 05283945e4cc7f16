//! File services: listing, placement, moves, deletes, upload, download.

pub mod download;
pub mod service;
pub mod upload;

pub use download::{DownloadResult, DownloadService};
pub use service::FileService;
pub use upload::{UploadRequest, UploadService};
