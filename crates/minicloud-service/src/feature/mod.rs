//! Feature settings.

pub mod service;

pub use service::{FeatureService, UpdateBlocklistRequest};
