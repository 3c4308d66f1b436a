//! # Soundcheck Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP client
//! - The Spotify Web API client (`MusicApi`)
//! - The form-encoded token exchanger (`TokenExchanger`)
//! - File and keychain credential stores
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `soundcheck-core` and `soundcheck-common`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod api;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod http;
pub mod storage;
pub mod wiring;

// Re-export commonly used items
pub use api::{SpotifyClient, SpotifyClientConfig};
pub use errors::InfraError;
pub use exchange::TokenEndpointExchanger;
pub use http::{HttpClient, HttpClientBuilder};
pub use storage::{credential_store, FileCredentialStore, KeychainCredentialStore};
pub use wiring::{build_controller, build_controller_with_store, listening_service};
