//! Authorization flow controller
//!
//! Owns the session. Drives login redirect, callback handling, the
//! code-for-token exchange (primary path, then at most one alternate) and the
//! token-to-profile resolution, and publishes every session change on a
//! `watch` channel.
//!
//! ```text
//! Unauthenticated ──login──► AwaitingRedirect ──callback(code)──► ExchangingCode
//!        ▲                                                            │
//!        └──────── logout / any unrecoverable failure ◄── Authenticated ◄┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use soundcheck_common::auth::pkce::DEFAULT_VERIFIER_LENGTH;
use soundcheck_common::auth::{
    generate_state, parse_callback, CallbackOutcome, CredentialStore, CredentialStoreError,
    OAuthConfig, PendingAuthorization, PkcePair, TokenExchangeRequest, TokenSet,
};
use soundcheck_domain::constants::DEFAULT_EXCHANGE_TIMEOUT_SECS;
use soundcheck_domain::{AuthState, Result, Session, SoundcheckError};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::{Navigator, TokenExchanger};
use crate::listening::MusicApi;

fn storage_error(err: CredentialStoreError) -> SoundcheckError {
    SoundcheckError::Storage(err.to_string())
}

/// Authorization flow controller
pub struct AuthFlowController {
    oauth: OAuthConfig,
    store: Arc<dyn CredentialStore>,
    api: Arc<dyn MusicApi>,
    /// Primary path first, then the alternate (if any)
    exchangers: Vec<Arc<dyn TokenExchanger>>,
    navigator: Option<Arc<dyn Navigator>>,
    exchange_timeout: Duration,
    verifier_length: usize,
    session_tx: watch::Sender<Session>,
    /// Serializes session writes and pending-verifier checks
    session_guard: Mutex<()>,
}

impl AuthFlowController {
    /// Create a controller with a single (primary) exchange path
    pub fn new(
        oauth: OAuthConfig,
        store: Arc<dyn CredentialStore>,
        api: Arc<dyn MusicApi>,
        exchanger: Arc<dyn TokenExchanger>,
    ) -> Self {
        let (session_tx, _) = watch::channel(Session::default());
        Self {
            oauth,
            store,
            api,
            exchangers: vec![exchanger],
            navigator: None,
            exchange_timeout: Duration::from_secs(DEFAULT_EXCHANGE_TIMEOUT_SECS),
            verifier_length: DEFAULT_VERIFIER_LENGTH,
            session_tx,
            session_guard: Mutex::new(()),
        }
    }

    /// Add the alternate exchange path, tried once when the primary fails.
    /// Replaces any previously configured alternate.
    #[must_use]
    pub fn with_fallback_exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchangers.truncate(1);
        self.exchangers.push(exchanger);
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Per-path bound on the token exchange
    #[must_use]
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_verifier_length(mut self, length: usize) -> Self {
        self.verifier_length = length;
        self
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    /// Receiver that observes every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    /// Shared API client, configured with the session's token
    pub fn api(&self) -> Arc<dyn MusicApi> {
        Arc::clone(&self.api)
    }

    fn publish(&self, session: Session) -> Session {
        debug!(state = %session.state, "Session updated");
        self.session_tx.send_replace(session.clone());
        session
    }

    /// Restore a persisted token on startup
    ///
    /// The session reports `is_loading` until the token has been resolved to
    /// a profile. A token that no longer resolves is discarded.
    pub async fn initialize(&self) -> Result<Session> {
        self.publish(Session::loading());

        let token = match self.store.load_access_token().await {
            Ok(token) => token,
            Err(err) => {
                self.publish(Session::default());
                return Err(storage_error(err));
            }
        };

        let Some(token) = token else {
            debug!("No persisted access token");
            return Ok(self.publish(Session::default()));
        };

        match self.set_access_token(token).await {
            Ok(session) => Ok(session),
            Err(err @ SoundcheckError::Storage(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "Discarded persisted access token");
                Ok(self.session())
            }
        }
    }

    /// Start a login attempt
    ///
    /// Generates a fresh PKCE pair and state, persists them (replacing any
    /// earlier unredeemed attempt), and hands the authorization URL to the
    /// navigator. Returns the URL as well.
    pub async fn login(&self) -> Result<String> {
        let pkce = PkcePair::generate(self.verifier_length);
        let state = generate_state();
        let url = self.oauth.authorization_url(&pkce, &state);

        {
            let _guard = self.session_guard.lock().await;
            self.store
                .store_pending(&PendingAuthorization::new(pkce.verifier, state))
                .await
                .map_err(storage_error)?;
            self.publish(Session::pending(AuthState::AwaitingRedirect));
        }

        info!(verifier_len = self.verifier_length, "Starting authorization redirect");

        if let Some(navigator) = &self.navigator {
            navigator.navigate(&url).await?;
        }

        Ok(url)
    }

    /// Handle the provider's redirect back to the app
    ///
    /// Priority: `error` parameter, then authorization code, then the
    /// deprecated implicit-grant fragment token.
    pub async fn handle_callback(&self, callback_url: &str) -> Result<Session> {
        let outcome = match parse_callback(callback_url) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.reset_unauthenticated().await;
                return Err(SoundcheckError::AuthError(err.to_string()));
            }
        };

        match outcome {
            CallbackOutcome::Error { error, description } => {
                warn!(error = %error, "Provider rejected authorization");
                {
                    let _guard = self.session_guard.lock().await;
                    if let Err(err) = self.store.clear_pending().await {
                        warn!(error = %err, "Failed to clear pending verifier");
                    }
                    self.reset_locked().await;
                }
                let message = match description {
                    Some(description) => format!("{error}: {description}"),
                    None => error,
                };
                Err(SoundcheckError::AuthError(message))
            }
            CallbackOutcome::Code { code, state } => {
                let pending = self.pending_or_reset().await?;
                if let Some(state) = state {
                    if state != pending.state {
                        warn!("Callback state does not match the pending login");
                        self.reset_unauthenticated().await;
                        return Err(SoundcheckError::StaleExchange);
                    }
                }
                self.exchange_pending(code, pending).await
            }
            CallbackOutcome::ImplicitToken { access_token, .. } => {
                warn!("Implicit-grant callback received; this flow is deprecated");
                self.set_access_token(access_token).await
            }
            CallbackOutcome::Empty => {
                self.reset_unauthenticated().await;
                Err(SoundcheckError::AuthError(
                    "callback carried neither an authorization code nor an error".into(),
                ))
            }
        }
    }

    /// Redeem an authorization code with the pending verifier
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Session> {
        let pending = self.pending_or_reset().await?;
        self.exchange_pending(code.to_string(), pending).await
    }

    /// Adopt an access token: persist it, configure the API client and
    /// resolve it to a profile
    ///
    /// If the profile fetch fails the session is logged out and the fetch
    /// error is returned.
    pub async fn set_access_token(&self, token: String) -> Result<Session> {
        let _guard = self.session_guard.lock().await;
        self.set_access_token_locked(token).await
    }

    /// Clear the session, the persisted token, the pending verifier and the
    /// API client's credential
    ///
    /// Idempotent. Every step runs even if an earlier one fails; the first
    /// storage failure is returned.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.session_guard.lock().await;
        self.logout_locked().await
    }

    async fn pending_or_reset(&self) -> Result<PendingAuthorization> {
        let pending = self.store.load_pending().await.map_err(storage_error)?;
        match pending {
            Some(pending) => Ok(pending),
            None => {
                warn!("Authorization code received with no pending verifier");
                self.reset_unauthenticated().await;
                Err(SoundcheckError::MissingVerifier)
            }
        }
    }

    async fn exchange_pending(
        &self,
        code: String,
        pending: PendingAuthorization,
    ) -> Result<Session> {
        {
            let _guard = self.session_guard.lock().await;
            if !self.is_current(&pending).await? {
                warn!("Pending verifier was replaced before the exchange started");
                return Err(SoundcheckError::StaleExchange);
            }
            self.publish(Session::pending(AuthState::ExchangingCode));
        }

        let request = TokenExchangeRequest {
            authorization_code: code,
            code_verifier: pending.verifier.clone(),
            redirect_uri: self.oauth.redirect_uri.clone(),
            client_id: self.oauth.client_id.clone(),
        };

        let result = self.run_exchange(&request).await;

        let _guard = self.session_guard.lock().await;
        let still_pending = self.is_current(&pending).await?;

        let tokens = match result {
            Ok(tokens) => tokens,
            Err(err) => {
                if still_pending {
                    if let Err(clear_err) = self.store.clear_pending().await {
                        warn!(error = %clear_err, "Failed to clear pending verifier");
                    }
                    self.reset_locked().await;
                }
                return Err(err);
            }
        };

        if !still_pending {
            warn!("Token exchange finished for a superseded login; discarding token");
            self.reset_locked().await;
            return Err(SoundcheckError::StaleExchange);
        }

        self.store.clear_pending().await.map_err(storage_error)?;
        self.set_access_token_locked(tokens.access_token).await
    }

    async fn run_exchange(&self, request: &TokenExchangeRequest) -> Result<TokenSet> {
        let mut last_error = String::from("no exchange path configured");

        for exchanger in &self.exchangers {
            let path = exchanger.label();
            match tokio::time::timeout(self.exchange_timeout, exchanger.exchange(request)).await {
                Ok(Ok(tokens)) => {
                    info!(path, "Token exchange succeeded");
                    return Ok(tokens);
                }
                Ok(Err(err)) => {
                    warn!(path, error = %err, "Token exchange path failed");
                    last_error = format!("{path}: {err}");
                }
                Err(_) => {
                    warn!(
                        path,
                        timeout_ms = u64::try_from(self.exchange_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                        "Token exchange timed out"
                    );
                    last_error = format!("{path}: timed out after {:?}", self.exchange_timeout);
                }
            }
        }

        Err(SoundcheckError::TokenExchangeFailed(last_error))
    }

    async fn set_access_token_locked(&self, token: String) -> Result<Session> {
        if let Err(err) = self.store.store_access_token(&token).await {
            self.logout_quietly().await;
            return Err(storage_error(err));
        }
        self.api.set_token(Some(token.clone()));
        self.publish(Session { is_loading: true, ..Session::default() });

        match self.api.get_profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session authenticated");
                Ok(self.publish(Session::authenticated(token, user)))
            }
            Err(err) => {
                warn!(error = %err, label = err.label(), "Access token did not resolve to a profile");
                self.logout_quietly().await;
                Err(err)
            }
        }
    }

    async fn logout_locked(&self) -> Result<()> {
        self.api.set_token(None);
        self.publish(Session::default());

        self.store.clear_all().await.map_err(storage_error)?;

        info!("Logged out");
        Ok(())
    }

    async fn logout_quietly(&self) {
        if let Err(err) = self.logout_locked().await {
            warn!(error = %err, "Logout after failure did not complete cleanly");
        }
    }

    /// Whether `pending` is still the persisted login attempt
    async fn is_current(&self, pending: &PendingAuthorization) -> Result<bool> {
        Ok(self
            .store
            .load_pending()
            .await
            .map_err(storage_error)?
            .is_some_and(|current| current.verifier == pending.verifier))
    }

    async fn reset_unauthenticated(&self) {
        let _guard = self.session_guard.lock().await;
        self.reset_locked().await;
    }

    /// Return to signed out after a failed or stale callback
    ///
    /// An authenticated session is left as it is: a replayed or late callback
    /// cannot sign the user out. Otherwise the API credential and persisted
    /// token are cleared along with the session. The pending verifier is not
    /// touched.
    async fn reset_locked(&self) {
        if self.session_tx.borrow().is_authenticated {
            debug!("Ignoring callback failure for an authenticated session");
            return;
        }

        self.api.set_token(None);
        if let Err(err) = self.store.clear_access_token().await {
            warn!(error = %err, "Failed to clear persisted access token");
        }
        self.publish(Session::default());
    }
}
