//! OAuth primitives shared across Soundcheck crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: PKCE, OAuth types, callback parsing
//! - `runtime`: async credential store trait and in-memory store (adds
//!   tracing)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{
    parse_callback, CallbackOutcome, OAuthConfig, PendingAuthorization, PkcePair,
    TokenExchangeRequest, TokenResponse, TokenSet,
};
#[cfg(feature = "runtime")]
pub use auth::{CredentialStore, CredentialStoreError, MemoryCredentialStore};
