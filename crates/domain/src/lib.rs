//! # Soundcheck Domain
//!
//! Business domain types and models for Soundcheck.
//!
//! This crate contains:
//! - Provider payload types (Profile, Artist, Track, paging)
//! - Session state and the error taxonomy
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Soundcheck crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
