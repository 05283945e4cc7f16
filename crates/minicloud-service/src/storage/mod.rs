//! Per-user storage accounting.

pub mod accounting;

pub use accounting::{StorageAccounting, UsageReconciliation};
