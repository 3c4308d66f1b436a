//! # Soundcheck Core
//!
//! Session and listening-statistics logic, with no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The authorization flow controller
//! - Composed listening-statistics reads
//!
//! ## Architecture Principles
//! - Only depends on `soundcheck-common` and `soundcheck-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod listening;

// Re-export specific items to avoid ambiguity
pub use auth::{AuthFlowController, Navigator, TokenExchanger};
pub use listening::{ListeningService, MusicApi};
