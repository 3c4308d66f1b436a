//! In-memory fakes for `MusicApi`, `TokenExchanger` and `Navigator`

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use soundcheck_common::auth::{
    CredentialStore, CredentialStoreError, MemoryCredentialStore, PendingAuthorization,
    TokenExchangeRequest, TokenSet,
};
use soundcheck_core::{MusicApi, Navigator, TokenExchanger};
use soundcheck_domain::{
    Artist, CursorPage, PagedResult, PlayHistory, Profile, Result, SoundcheckError, TimeRange,
    Track,
};
use tokio::sync::Notify;

/// `MusicApi` that knows a fixed set of valid tokens
#[derive(Default)]
pub struct FakeMusicApi {
    token: Mutex<Option<String>>,
    profiles: Mutex<HashMap<String, Profile>>,
    top_artists: Mutex<Vec<Artist>>,
    top_tracks: Mutex<Vec<Track>>,
    top_tracks_error: Mutex<Option<SoundcheckError>>,
    recommendation_calls: Mutex<Vec<(Vec<String>, Vec<String>, u32)>>,
    pub profile_calls: AtomicUsize,
}

impl FakeMusicApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` and resolve it to `profile`
    pub fn with_profile(self, token: &str, profile: Profile) -> Self {
        self.profiles.lock().insert(token.to_string(), profile);
        self
    }

    pub fn with_top_artists(self, artists: Vec<Artist>) -> Self {
        *self.top_artists.lock() = artists;
        self
    }

    pub fn with_top_tracks(self, tracks: Vec<Track>) -> Self {
        *self.top_tracks.lock() = tracks;
        self
    }

    pub fn failing_top_tracks(self, error: SoundcheckError) -> Self {
        *self.top_tracks_error.lock() = Some(error);
        self
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    pub fn recommendation_calls(&self) -> Vec<(Vec<String>, Vec<String>, u32)> {
        self.recommendation_calls.lock().clone()
    }

    fn require_token(&self) -> Result<String> {
        self.token.lock().clone().ok_or(SoundcheckError::Unauthenticated)
    }
}

#[async_trait]
impl MusicApi for FakeMusicApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.lock() = token;
    }

    fn has_token(&self) -> bool {
        self.token.lock().is_some()
    }

    async fn get_profile(&self) -> Result<Profile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let token = self.require_token()?;
        self.profiles.lock().get(&token).cloned().ok_or(SoundcheckError::Unauthenticated)
    }

    async fn get_top_artists(&self, _range: TimeRange, limit: u32) -> Result<PagedResult<Artist>> {
        self.require_token()?;
        Ok(PagedResult::single(self.top_artists.lock().clone(), limit))
    }

    async fn get_top_tracks(&self, _range: TimeRange, limit: u32) -> Result<PagedResult<Track>> {
        self.require_token()?;
        if let Some(err) = self.top_tracks_error.lock().clone() {
            return Err(err);
        }
        Ok(PagedResult::single(self.top_tracks.lock().clone(), limit))
    }

    async fn get_recommendations(
        &self,
        seed_artists: &[String],
        seed_tracks: &[String],
        limit: u32,
    ) -> Result<PagedResult<Track>> {
        self.require_token()?;
        self.recommendation_calls.lock().push((seed_artists.to_vec(), seed_tracks.to_vec(), limit));
        Ok(PagedResult::single(Vec::new(), limit))
    }

    async fn get_recently_played(&self, limit: u32) -> Result<CursorPage<PlayHistory>> {
        self.require_token()?;
        Ok(CursorPage { items: Vec::new(), limit, next: None, cursors: None, href: None })
    }
}

/// How a `ScriptedExchanger` answers
pub enum ExchangeScript {
    Token(String),
    Fail(SoundcheckError),
    /// Never answers
    Hang,
}

/// `TokenExchanger` with a fixed answer and an optional gate
pub struct ScriptedExchanger {
    label: String,
    script: ExchangeScript,
    /// When set, `exchange` signals `entered` and waits for `gate`
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
    requests: Mutex<Vec<TokenExchangeRequest>>,
}

impl ScriptedExchanger {
    pub fn new(label: &str, script: ExchangeScript) -> Self {
        Self { label: label.to_string(), script, gate: None, requests: Mutex::new(Vec::new()) }
    }

    pub fn token(label: &str, token: &str) -> Self {
        Self::new(label, ExchangeScript::Token(token.to_string()))
    }

    /// Returns `(entered, gate)`: await `entered` to know the exchange is in
    /// flight, notify `gate` to let it finish.
    pub fn gated(mut self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        self.gate = Some((Arc::clone(&entered), Arc::clone(&gate)));
        (self, entered, gate)
    }

    pub fn requests(&self) -> Vec<TokenExchangeRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TokenExchanger for ScriptedExchanger {
    fn label(&self) -> &str {
        &self.label
    }

    async fn exchange(&self, request: &TokenExchangeRequest) -> Result<TokenSet> {
        self.requests.lock().push(request.clone());

        if let Some((entered, gate)) = &self.gate {
            entered.notify_one();
            gate.notified().await;
        }

        match &self.script {
            ExchangeScript::Token(token) => Ok(TokenSet::new(token.clone(), 3600, None, None)),
            ExchangeScript::Fail(err) => Err(err.clone()),
            ExchangeScript::Hang => std::future::pending().await,
        }
    }
}

/// Records every URL it is asked to open
#[derive(Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.urls.lock().push(url.to_string());
        Ok(())
    }
}

/// Memory store whose access-token removal always fails
#[derive(Default)]
pub struct StuckTokenStore {
    pub inner: MemoryCredentialStore,
}

#[async_trait]
impl CredentialStore for StuckTokenStore {
    async fn load_access_token(
        &self,
    ) -> std::result::Result<Option<String>, CredentialStoreError> {
        self.inner.load_access_token().await
    }

    async fn store_access_token(
        &self,
        token: &str,
    ) -> std::result::Result<(), CredentialStoreError> {
        self.inner.store_access_token(token).await
    }

    async fn clear_access_token(&self) -> std::result::Result<(), CredentialStoreError> {
        Err(CredentialStoreError::Backend("token entry is locked".into()))
    }

    async fn load_pending(
        &self,
    ) -> std::result::Result<Option<PendingAuthorization>, CredentialStoreError> {
        self.inner.load_pending().await
    }

    async fn store_pending(
        &self,
        pending: &PendingAuthorization,
    ) -> std::result::Result<(), CredentialStoreError> {
        self.inner.store_pending(pending).await
    }

    async fn clear_pending(&self) -> std::result::Result<(), CredentialStoreError> {
        self.inner.clear_pending().await
    }
}
