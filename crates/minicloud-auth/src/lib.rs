//! # minicloud-auth
//!
//! Authentication and authorization for MiniCloud.
//!
//! ## Modules
//!
//! - `jwt`: signed, stateless bearer tokens carrying identity and role
//! - `password`: Argon2id hashing and the password policy
//! - `access`: the access control evaluator for owner and admin actions
//! - `throttle`: sliding-window login throttling

pub mod access;
pub mod jwt;
pub mod password;
pub mod throttle;

pub use access::{AccessEvaluator, Actor, AdminAction, TargetAccount};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use throttle::LoginThrottle;
