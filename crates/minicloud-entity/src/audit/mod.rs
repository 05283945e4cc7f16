//! Security ledger entities.

pub mod model;

pub use model::{LoginAttempt, NewSecurityEvent, SecurityEvent, SecurityEventKind};
