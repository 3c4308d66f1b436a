//! Traits for credential persistence
//!
//! The flow controller only ever talks to this trait, so the browser-style
//! file store, the platform keychain and the in-memory test store are
//! interchangeable.

use async_trait::async_trait;
use thiserror::Error;

use super::types::PendingAuthorization;

/// Error type for credential store operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    #[error("Credential store I/O error: {0}")]
    Io(String),

    #[error("Credential store serialization error: {0}")]
    Serialization(String),

    #[error("Credential store backend error: {0}")]
    Backend(String),
}

/// Trait for credential storage
///
/// Holds at most one access token and at most one pending authorization.
/// Storing a pending authorization replaces any previous one; clearing a
/// missing entry is not an error.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the persisted access token, if any
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    async fn load_access_token(&self) -> Result<Option<String>, CredentialStoreError>;

    /// Persist the access token, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    async fn store_access_token(&self, token: &str) -> Result<(), CredentialStoreError>;

    /// Remove the access token
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    async fn clear_access_token(&self) -> Result<(), CredentialStoreError>;

    /// Load the pending authorization (verifier + state), if any
    ///
    /// # Errors
    /// Returns error if the backend cannot be read or the entry is corrupt
    async fn load_pending(&self) -> Result<Option<PendingAuthorization>, CredentialStoreError>;

    /// Persist the pending authorization, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    async fn store_pending(&self, pending: &PendingAuthorization)
        -> Result<(), CredentialStoreError>;

    /// Remove the pending authorization
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    async fn clear_pending(&self) -> Result<(), CredentialStoreError>;

    /// Remove everything
    ///
    /// Both removals are attempted even if the first one fails.
    ///
    /// # Errors
    /// Returns the first backend error encountered
    async fn clear_all(&self) -> Result<(), CredentialStoreError> {
        let token = self.clear_access_token().await;
        let pending = self.clear_pending().await;
        token.and(pending)
    }
}
