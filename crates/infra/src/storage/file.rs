//! JSON-file credential store
//!
//! One small JSON document, keyed exactly like the browser's local storage.
//! Writes go to a sibling temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use soundcheck_common::auth::{CredentialStore, CredentialStoreError, PendingAuthorization};
use soundcheck_domain::constants::{STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_CODE_VERIFIER};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type Document = Map<String, Value>;

/// File-backed `CredentialStore`
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document, CredentialStoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(CredentialStoreError::Io(err.to_string())),
        };

        if contents.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %self.path.display(), "Credential file is not a JSON object");
            CredentialStoreError::Serialization(e.to_string())
        })
    }

    async fn write_document(&self, document: &Document) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialStoreError::Io(e.to_string()))?;
        }

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;

        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| CredentialStoreError::Io(e.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| CredentialStoreError::Io(e.to_string()))
    }

    async fn update<F>(&self, apply: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        apply(&mut document);
        self.write_document(&document).await
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load_access_token(&self) -> Result<Option<String>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        Ok(document.get(STORAGE_KEY_ACCESS_TOKEN).and_then(Value::as_str).map(str::to_string))
    }

    async fn store_access_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        let token = token.to_string();
        self.update(move |doc| {
            doc.insert(STORAGE_KEY_ACCESS_TOKEN.to_string(), Value::String(token));
        })
        .await
    }

    async fn clear_access_token(&self) -> Result<(), CredentialStoreError> {
        self.update(|doc| {
            doc.remove(STORAGE_KEY_ACCESS_TOKEN);
        })
        .await
    }

    async fn load_pending(&self) -> Result<Option<PendingAuthorization>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        match document.get(STORAGE_KEY_CODE_VERIFIER) {
            None | Some(Value::Null) => Ok(None),
            Some(entry) => serde_json::from_value(entry.clone())
                .map(Some)
                .map_err(|e| CredentialStoreError::Serialization(e.to_string())),
        }
    }

    async fn store_pending(
        &self,
        pending: &PendingAuthorization,
    ) -> Result<(), CredentialStoreError> {
        let entry = serde_json::to_value(pending)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;
        self.update(move |doc| {
            if doc.insert(STORAGE_KEY_CODE_VERIFIER.to_string(), entry).is_some() {
                debug!("Replaced pending authorization");
            }
        })
        .await
    }

    async fn clear_pending(&self) -> Result<(), CredentialStoreError> {
        self.update(|doc| {
            doc.remove(STORAGE_KEY_CODE_VERIFIER);
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), CredentialStoreError> {
        self.update(|doc| {
            doc.remove(STORAGE_KEY_ACCESS_TOKEN);
            doc.remove(STORAGE_KEY_CODE_VERIFIER);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("credentials.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load_access_token().await.unwrap(), None);
        assert_eq!(store.load_pending().await.unwrap(), None);
    }

    #[tokio::test]
    async fn token_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).store_access_token("tok1").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.load_access_token().await.unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn uses_fixed_keys_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.store_access_token("tok1").await.unwrap();
        store
            .store_pending(&PendingAuthorization::new("v1".into(), "s1".into()))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["spotify_access_token"], "tok1");
        assert_eq!(doc["code_verifier"]["verifier"], "v1");
        assert_eq!(doc["code_verifier"]["state"], "s1");
    }

    #[tokio::test]
    async fn storing_pending_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();
        store.store_pending(&PendingAuthorization::new("v2".into(), "s2".into())).await.unwrap();

        let pending = store.load_pending().await.unwrap().unwrap();
        assert_eq!(pending.verifier, "v2");
        assert_eq!(pending.state, "s2");
    }

    #[tokio::test]
    async fn clearing_one_key_keeps_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.store_access_token("tok1").await.unwrap();
        store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();

        store.clear_pending().await.unwrap();

        assert_eq!(store.load_access_token().await.unwrap().as_deref(), Some("tok1"));
        assert_eq!(store.load_pending().await.unwrap(), None);

        store.clear_all().await.unwrap();
        store.clear_all().await.unwrap();
        assert_eq!(store.load_access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.load_access_token().await.unwrap_err();
        assert!(matches!(err, CredentialStoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/dir/credentials.json"));

        store.store_access_token("tok1").await.unwrap();

        assert!(store.path().exists());
    }
}
