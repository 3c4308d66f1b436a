//! In-memory credential store
//!
//! Used by tests and by sessions that should not survive a restart.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::traits::{CredentialStore, CredentialStoreError};
use super::types::PendingAuthorization;

#[derive(Debug, Default)]
struct Entries {
    access_token: Option<String>,
    pending: Option<PendingAuthorization>,
}

/// Process-local `CredentialStore`
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<Entries>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an access token, as if restored from a
    /// previous run.
    #[must_use]
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        store.entries.lock().access_token = Some(token.into());
        store
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load_access_token(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.entries.lock().access_token.clone())
    }

    async fn store_access_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.entries.lock().access_token = Some(token.to_string());
        Ok(())
    }

    async fn clear_access_token(&self) -> Result<(), CredentialStoreError> {
        self.entries.lock().access_token = None;
        Ok(())
    }

    async fn load_pending(&self) -> Result<Option<PendingAuthorization>, CredentialStoreError> {
        Ok(self.entries.lock().pending.clone())
    }

    async fn store_pending(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<(), CredentialStoreError> {
        let replaced = self.entries.lock().pending.replace(pending.clone()).is_some();
        debug!(replaced, "Stored pending authorization");
        Ok(())
    }

    async fn clear_pending(&self) -> Result<(), CredentialStoreError> {
        self.entries.lock().pending = None;
        Ok(())
    }
}
