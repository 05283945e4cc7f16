//! Feature settings stored in the `plugins` table.

pub mod model;

pub use model::{ExtensionBlocklist, FeatureRecord, FeatureSetting};
