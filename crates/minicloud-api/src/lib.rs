//! # minicloud-api
//!
//! HTTP API layer for MiniCloud built on Axum.
//!
//! Provides the REST endpoints, the bearer-token extractor, request and
//! response DTOs, and the middleware stack (CORS, compression, tracing and
//! request logging). Error rendering lives with `AppError` in
//! `minicloud-core`.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
