//! # Soundcheck API
//!
//! The trusted token-exchange intermediary.
//!
//! This crate contains:
//! - The axum router (`POST /api/token`, `GET /health`)
//! - The request context built from the `server` config section
//! - The `soundcheck-exchange` binary entry point
//!
//! ## Architecture
//! - Depends on `domain` and `infra`
//! - Holds no session state; every request is independent

pub mod context;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::ExchangeContext;
pub use routes::router;
