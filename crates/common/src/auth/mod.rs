//! OAuth 2.0 authorization-code + PKCE primitives
//!
//! # Module Organization
//!
//! - **[`pkce`]**: Verifier/challenge generation (RFC 7636, S256)
//! - **[`types`]**: `TokenSet`, `OAuthConfig`, `TokenExchangeRequest`,
//!   `PendingAuthorization`
//! - **[`callback`]**: Redirect callback URL parsing
//! - **[`traits`]**: `CredentialStore` persistence seam (runtime feature)
//! - **[`store`]**: In-memory `CredentialStore` (runtime feature)
//!
//! # Flow
//!
//! ```text
//! login ──► PkcePair + state ──► CredentialStore::store_pending
//!       └─► OAuthConfig::authorization_url ──► browser
//!
//! callback URL ──► parse_callback ──► CallbackOutcome::Code
//!              └─► TokenExchangeRequest (code + pending verifier) ──► exchanger
//! ```

pub mod callback;
pub mod pkce;
#[cfg(feature = "runtime")]
pub mod store;
#[cfg(feature = "runtime")]
pub mod traits;
pub mod types;

// Re-export commonly used types and functions
pub use callback::{parse_callback, CallbackOutcome, CallbackParseError};
pub use pkce::{derive_challenge, generate_state, generate_verifier, PkcePair};
#[cfg(feature = "runtime")]
pub use store::MemoryCredentialStore;
#[cfg(feature = "runtime")]
pub use traits::{CredentialStore, CredentialStoreError};
pub use types::{
    OAuthConfig, OAuthError, PendingAuthorization, TokenExchangeRequest, TokenResponse, TokenSet,
};
