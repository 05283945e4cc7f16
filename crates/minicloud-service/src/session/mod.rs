//! Registration and login.

pub mod service;

pub use service::{LoginRequest, LoginResponse, RegisterRequest, SessionService};
