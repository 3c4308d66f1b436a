//! `CredentialStore` backends
//!
//! Both backends keep the fixed browser keys (`spotify_access_token`,
//! `code_verifier`) so a stored session is recognisable whichever backend
//! wrote it.

pub mod file;
pub mod keychain;

use std::sync::Arc;

pub use file::FileCredentialStore;
pub use keychain::KeychainCredentialStore;
use soundcheck_common::auth::{CredentialStore, MemoryCredentialStore};
use soundcheck_domain::{Result, StorageBackend, StorageSettings};
use tracing::info;

/// Build the store selected by configuration
///
/// # Errors
///
/// Returns `SoundcheckError::Storage` if the keychain entries cannot be
/// opened.
pub fn credential_store(settings: &StorageSettings) -> Result<Arc<dyn CredentialStore>> {
    info!(backend = %settings.backend, "Using credential store");
    Ok(match settings.backend {
        StorageBackend::File => Arc::new(FileCredentialStore::new(&settings.path)),
        StorageBackend::Keychain => {
            Arc::new(KeychainCredentialStore::new(settings.keychain_service.clone())?)
        }
        StorageBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    })
}
