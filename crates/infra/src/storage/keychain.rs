//! Platform keychain credential store
//!
//! Each key is a separate keychain entry under one service name. The pending
//! authorization is stored as a JSON string.

use std::sync::Arc;

use async_trait::async_trait;
use keyring::Entry;
use soundcheck_common::auth::{CredentialStore, CredentialStoreError, PendingAuthorization};
use soundcheck_domain::constants::{STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_CODE_VERIFIER};
use soundcheck_domain::Result as DomainResult;
use tracing::debug;

use crate::errors::InfraError;

/// `CredentialStore` backed by macOS Keychain / Windows Credential Manager /
/// the Linux kernel keyring
///
/// Entries are resolved once at construction and reused for every call.
#[derive(Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
    access_token: Arc<Entry>,
    code_verifier: Arc<Entry>,
}

impl std::fmt::Debug for KeychainCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainCredentialStore")
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}

fn backend_error(err: keyring::Error) -> CredentialStoreError {
    CredentialStoreError::from(InfraError::from(err))
}

impl KeychainCredentialStore {
    /// Open the entries for both keys under `service_name`
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Storage` if the platform store rejects the
    /// service or key names.
    pub fn new(service_name: impl Into<String>) -> DomainResult<Self> {
        let service_name = service_name.into();
        let entry = |key: &str| {
            Entry::new(&service_name, key).map(Arc::new).map_err(|e| InfraError::from(e).0)
        };

        Ok(Self {
            access_token: entry(STORAGE_KEY_ACCESS_TOKEN)?,
            code_verifier: entry(STORAGE_KEY_CODE_VERIFIER)?,
            service_name,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &'static str) -> Arc<Entry> {
        if key == STORAGE_KEY_ACCESS_TOKEN {
            Arc::clone(&self.access_token)
        } else {
            Arc::clone(&self.code_verifier)
        }
    }

    /// Keychain calls block; run them off the async executor.
    async fn blocking<T, F>(&self, key: &'static str, op: F) -> Result<T, CredentialStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        debug!(service = %self.service_name, key, "Accessing keychain");
        let entry = self.entry(key);

        tokio::task::spawn_blocking(move || op(&entry).map_err(backend_error))
            .await
            .map_err(|e| CredentialStoreError::Backend(format!("keychain task failed: {e}")))?
    }

    async fn get(&self, key: &'static str) -> Result<Option<String>, CredentialStoreError> {
        self.blocking(key, |entry| match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &'static str, value: String) -> Result<(), CredentialStoreError> {
        self.blocking(key, move |entry| entry.set_password(&value)).await
    }

    /// Idempotent: a missing entry is not an error.
    async fn delete(&self, key: &'static str) -> Result<(), CredentialStoreError> {
        self.blocking(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}

fn decode_pending(raw: &str) -> Result<PendingAuthorization, CredentialStoreError> {
    serde_json::from_str(raw).map_err(|e| CredentialStoreError::Serialization(e.to_string()))
}

fn encode_pending(pending: &PendingAuthorization) -> Result<String, CredentialStoreError> {
    serde_json::to_string(pending).map_err(|e| CredentialStoreError::Serialization(e.to_string()))
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn load_access_token(&self) -> Result<Option<String>, CredentialStoreError> {
        self.get(STORAGE_KEY_ACCESS_TOKEN).await
    }

    async fn store_access_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.set(STORAGE_KEY_ACCESS_TOKEN, token.to_string()).await
    }

    async fn clear_access_token(&self) -> Result<(), CredentialStoreError> {
        self.delete(STORAGE_KEY_ACCESS_TOKEN).await
    }

    async fn load_pending(&self) -> Result<Option<PendingAuthorization>, CredentialStoreError> {
        match self.get(STORAGE_KEY_CODE_VERIFIER).await? {
            Some(raw) => decode_pending(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn store_pending(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<(), CredentialStoreError> {
        self.set(STORAGE_KEY_CODE_VERIFIER, encode_pending(pending)?).await
    }

    async fn clear_pending(&self) -> Result<(), CredentialStoreError> {
        self.delete(STORAGE_KEY_CODE_VERIFIER).await
    }
}
