//! Access control evaluator.
//!
//! Pure decisions over a caller and a target; callers record audit events
//! for granted administrative actions themselves.

pub mod evaluator;

pub use evaluator::{AccessEvaluator, Actor, AdminAction, TargetAccount};
