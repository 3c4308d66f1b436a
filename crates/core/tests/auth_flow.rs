//! Integration tests for the authorization flow controller
//!
//! Drives `AuthFlowController` through the public API with in-memory fakes
//! for the credential store, exchange paths, API client and navigator.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use soundcheck_common::auth::{
    derive_challenge, CredentialStore, MemoryCredentialStore, OAuthConfig, PendingAuthorization,
};
use soundcheck_core::{AuthFlowController, MusicApi};
use soundcheck_domain::{AuthState, SoundcheckError};
use support::fakes::{
    ExchangeScript, FakeMusicApi, RecordingNavigator, ScriptedExchanger, StuckTokenStore,
};
use support::{profile, query_param};

const REDIRECT_URI: &str = "http://localhost:5173/callback";

fn oauth() -> OAuthConfig {
    OAuthConfig::new(
        "client-abc".to_string(),
        REDIRECT_URI.to_string(),
        "https://accounts.spotify.com/authorize".to_string(),
        vec![
            "user-read-private".to_string(),
            "user-read-email".to_string(),
            "user-top-read".to_string(),
        ],
    )
}

struct Harness {
    controller: Arc<AuthFlowController>,
    store: Arc<MemoryCredentialStore>,
    api: Arc<FakeMusicApi>,
    exchanger: Arc<ScriptedExchanger>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(api: FakeMusicApi, exchanger: ScriptedExchanger) -> Harness {
    let store = Arc::new(MemoryCredentialStore::new());
    let api = Arc::new(api);
    let exchanger = Arc::new(exchanger);
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = Arc::new(
        AuthFlowController::new(oauth(), store.clone(), api.clone(), exchanger.clone())
            .with_navigator(navigator.clone()),
    );
    Harness { controller, store, api, exchanger, navigator }
}

/// Validates the complete login round trip.
///
/// # Test Steps
/// 1. `login()` persists a verifier and opens an authorize URL whose
///    challenge is the S256 hash of that verifier
/// 2. The provider redirects back with a code and the same state
/// 3. The exchange receives the code and stored verifier
/// 4. The session ends `Authenticated`, token persisted, verifier cleared
#[tokio::test]
async fn test_login_callback_round_trip() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );

    let url = h.controller.login().await.expect("login");
    assert_eq!(h.navigator.urls(), vec![url.clone()]);
    assert_eq!(h.controller.session().state, AuthState::AwaitingRedirect);

    let pending = h.store.load_pending().await.unwrap().expect("pending verifier");
    assert_eq!(pending.verifier.len(), 128);
    assert_eq!(query_param(&url, "code_challenge"), Some(derive_challenge(&pending.verifier)));
    assert_eq!(query_param(&url, "code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("code"));
    let state = query_param(&url, "state").expect("state param");

    let session = h
        .controller
        .handle_callback(&format!("{REDIRECT_URI}?code=abc123&state={state}"))
        .await
        .expect("callback");

    assert!(session.is_authenticated);
    assert_eq!(session.state, AuthState::Authenticated);
    assert_eq!(session.access_token.as_deref(), Some("tok1"));
    assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("u1"));

    let requests = h.exchanger.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization_code, "abc123");
    assert_eq!(requests[0].code_verifier, pending.verifier);
    assert_eq!(requests[0].redirect_uri, REDIRECT_URI);
    assert_eq!(requests[0].client_id, "client-abc");

    assert_eq!(h.store.load_access_token().await.unwrap().as_deref(), Some("tok1"));
    assert!(h.store.load_pending().await.unwrap().is_none());
    assert_eq!(h.api.current_token().as_deref(), Some("tok1"));
    assert_eq!(h.controller.subscribe().borrow().state, AuthState::Authenticated);
}

/// Scenario: code `abc123`, pending verifier `v1`, token `tok1`, user `u1`
/// "Ada".
#[tokio::test]
async fn test_exchange_code_for_token_with_stored_verifier() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    h.store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();

    let session = h.controller.exchange_code_for_token("abc123").await.expect("exchange");

    assert!(session.is_authenticated);
    assert!(!session.is_loading);
    let user = session.user.expect("user");
    assert_eq!(user.id, "u1");
    assert_eq!(user.display_name.as_deref(), Some("Ada"));
    assert_eq!(h.exchanger.requests()[0].code_verifier, "v1");
}

/// A callback from the first of two logins is stale.
///
/// # Test Steps
/// 1. Log in twice
/// 2. Deliver the first login's callback
/// 3. Expect `StaleExchange`, no exchange call, second verifier intact
#[tokio::test]
async fn test_double_login_makes_first_callback_stale() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));

    let first_url = h.controller.login().await.unwrap();
    h.controller.login().await.unwrap();
    let second = h.store.load_pending().await.unwrap().unwrap();

    let first_state = query_param(&first_url, "state").unwrap();
    let err = h
        .controller
        .handle_callback(&format!("{REDIRECT_URI}?code=old&state={first_state}"))
        .await
        .unwrap_err();

    assert_eq!(err, SoundcheckError::StaleExchange);
    assert_eq!(h.exchanger.call_count(), 0);
    assert_eq!(h.controller.session().state, AuthState::Unauthenticated);
    assert_eq!(h.store.load_pending().await.unwrap(), Some(second));
}

/// A login started while an exchange is in flight discards that exchange's
/// token.
///
/// # Test Steps
/// 1. Start an exchange that blocks inside the exchanger
/// 2. Call `login()` again while it is blocked
/// 3. Release the exchange; it must fail with `StaleExchange`
/// 4. No token is persisted and the newer verifier is kept
#[tokio::test]
async fn test_exchange_superseded_while_in_flight() {
    let (exchanger, entered, gate) = ScriptedExchanger::token("intermediary", "tok1").gated();
    let h = harness(FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")), exchanger);

    h.controller.login().await.unwrap();

    let controller = Arc::clone(&h.controller);
    let in_flight =
        tokio::spawn(async move { controller.handle_callback("/callback?code=abc123").await });

    entered.notified().await;
    h.controller.login().await.unwrap();
    let newer = h.store.load_pending().await.unwrap().unwrap();
    gate.notify_one();

    let err = in_flight.await.unwrap().unwrap_err();
    assert_eq!(err, SoundcheckError::StaleExchange);
    assert!(h.store.load_access_token().await.unwrap().is_none());
    assert_eq!(h.store.load_pending().await.unwrap(), Some(newer));
    assert!(!h.controller.session().is_authenticated);
    assert_eq!(h.api.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_access_denied_never_exchanges() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));
    h.controller.login().await.unwrap();

    let err = h
        .controller
        .handle_callback(&format!("{REDIRECT_URI}?error=access_denied"))
        .await
        .unwrap_err();

    assert!(matches!(err, SoundcheckError::AuthError(ref msg) if msg.contains("access_denied")));
    assert_eq!(h.exchanger.call_count(), 0);
    assert_eq!(h.controller.session().state, AuthState::Unauthenticated);
    assert!(h.store.load_pending().await.unwrap().is_none());
}

#[tokio::test]
async fn test_code_without_pending_verifier() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));

    let err = h.controller.handle_callback("/callback?code=abc123").await.unwrap_err();

    assert_eq!(err, SoundcheckError::MissingVerifier);
    assert_eq!(h.exchanger.call_count(), 0);
    assert_eq!(h.controller.session().state, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_empty_callback_is_auth_error() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));

    let err = h.controller.handle_callback("/callback").await.unwrap_err();

    assert!(matches!(err, SoundcheckError::AuthError(_)));
    assert!(!h.controller.session().is_authenticated);
}

/// Log in through the full redirect round trip and return the callback URL
async fn signed_in(h: &Harness) -> String {
    let url = h.controller.login().await.expect("login");
    let state = query_param(&url, "state").expect("state param");
    let callback = format!("{REDIRECT_URI}?code=abc123&state={state}");
    h.controller.handle_callback(&callback).await.expect("callback");
    callback
}

async fn assert_still_signed_in(h: &Harness) {
    let session = h.controller.session();
    assert!(session.is_authenticated);
    assert_eq!(session.state, AuthState::Authenticated);
    assert_eq!(session.access_token.as_deref(), Some("tok1"));
    assert_eq!(h.api.current_token().as_deref(), Some("tok1"));
    assert_eq!(h.store.load_access_token().await.unwrap().as_deref(), Some("tok1"));
}

/// Revisiting the callback URL after login must not sign the user out.
///
/// # Test Steps
/// 1. Complete a login
/// 2. Deliver the same callback URL again
/// 3. Expect `MissingVerifier`, no second exchange, session and credential
///    unchanged
#[tokio::test]
async fn test_replayed_callback_keeps_authenticated_session() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    let callback = signed_in(&h).await;

    let err = h.controller.handle_callback(&callback).await.unwrap_err();

    assert_eq!(err, SoundcheckError::MissingVerifier);
    assert_eq!(h.exchanger.call_count(), 1);
    assert_still_signed_in(&h).await;
}

/// Two deliveries of one callback leave exactly one consistent session.
#[tokio::test]
async fn test_duplicate_callbacks_end_authenticated() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    h.controller.login().await.unwrap();

    let (a, b) = tokio::join!(
        h.controller.handle_callback("/callback?code=abc123"),
        h.controller.handle_callback("/callback?code=abc123"),
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let err = a.err().or(b.err()).unwrap();
    assert!(matches!(err, SoundcheckError::MissingVerifier | SoundcheckError::StaleExchange));
    assert_still_signed_in(&h).await;
    assert!(h.store.load_pending().await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_callback_after_login_keeps_session() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    signed_in(&h).await;

    let err = h.controller.handle_callback("/callback").await.unwrap_err();

    assert!(matches!(err, SoundcheckError::AuthError(_)));
    assert_still_signed_in(&h).await;
}

/// A re-login that fails leaves no credential behind a signed-out session.
///
/// # Test Steps
/// 1. Complete a login, then start another one
/// 2. The provider denies the second authorization
/// 3. Session, API client and store all agree on signed out
#[tokio::test]
async fn test_failed_relogin_clears_previous_credential() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    signed_in(&h).await;
    h.controller.login().await.unwrap();

    let err = h
        .controller
        .handle_callback(&format!("{REDIRECT_URI}?error=access_denied"))
        .await
        .unwrap_err();

    assert!(matches!(err, SoundcheckError::AuthError(_)));
    let session = h.controller.session();
    assert!(!session.is_authenticated);
    assert!(session.access_token.is_none());
    assert!(!h.api.has_token());
    assert!(h.store.load_access_token().await.unwrap().is_none());
    assert!(h.store.load_pending().await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_fragment_token_is_adopted() {
    let h = harness(
        FakeMusicApi::new().with_profile("imp1", profile("u9", "Grace")),
        ScriptedExchanger::token("intermediary", "unused"),
    );

    let session = h
        .controller
        .handle_callback("/callback#access_token=imp1&token_type=Bearer&expires_in=3600")
        .await
        .expect("implicit token");

    assert!(session.is_authenticated);
    assert_eq!(session.access_token.as_deref(), Some("imp1"));
    assert_eq!(h.exchanger.call_count(), 0);
}

/// Scenario: a token the provider rejects clears the session.
#[tokio::test]
async fn test_bad_token_logs_out() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));

    let err = h.controller.set_access_token("bad-token".into()).await.unwrap_err();

    assert_eq!(err, SoundcheckError::Unauthenticated);
    let session = h.controller.session();
    assert!(session.access_token.is_none());
    assert!(session.user.is_none());
    assert!(!session.is_authenticated);
    assert!(h.store.load_access_token().await.unwrap().is_none());
    assert!(!h.api.has_token());
}

#[tokio::test]
async fn test_primary_failure_falls_back_once() {
    let store = Arc::new(MemoryCredentialStore::new());
    let api = Arc::new(FakeMusicApi::new().with_profile("tok2", profile("u1", "Ada")));
    let primary = Arc::new(ScriptedExchanger::new(
        "intermediary",
        ExchangeScript::Fail(SoundcheckError::request_failed("connection refused")),
    ));
    let fallback = Arc::new(ScriptedExchanger::token("fallback", "tok2"));
    let controller =
        AuthFlowController::new(oauth(), store.clone(), api.clone(), primary.clone())
            .with_fallback_exchanger(fallback.clone());

    store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();
    let session = controller.exchange_code_for_token("abc123").await.expect("fallback exchange");

    assert!(session.is_authenticated);
    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 1);
    assert_eq!(fallback.requests()[0].code_verifier, "v1");
}

#[tokio::test]
async fn test_all_paths_failing_clears_verifier() {
    let store = Arc::new(MemoryCredentialStore::new());
    let api = Arc::new(FakeMusicApi::new());
    let primary = Arc::new(ScriptedExchanger::new(
        "intermediary",
        ExchangeScript::Fail(SoundcheckError::TokenExchangeFailed("invalid_grant".into())),
    ));
    let fallback = Arc::new(ScriptedExchanger::new(
        "fallback",
        ExchangeScript::Fail(SoundcheckError::request_failed("503")),
    ));
    let controller = AuthFlowController::new(oauth(), store.clone(), api, primary.clone())
        .with_fallback_exchanger(fallback.clone());

    store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();
    let err = controller.exchange_code_for_token("abc123").await.unwrap_err();

    assert!(matches!(err, SoundcheckError::TokenExchangeFailed(ref msg) if msg.starts_with("fallback")));
    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 1);
    assert!(store.load_pending().await.unwrap().is_none());
    assert_eq!(controller.session().state, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_exchange_timeout_is_bounded() {
    let store = Arc::new(MemoryCredentialStore::new());
    let exchanger = Arc::new(ScriptedExchanger::new("intermediary", ExchangeScript::Hang));
    let controller =
        AuthFlowController::new(oauth(), store.clone(), Arc::new(FakeMusicApi::new()), exchanger)
            .with_exchange_timeout(Duration::from_millis(50));

    store.store_pending(&PendingAuthorization::new("v1".into(), "s1".into())).await.unwrap();
    let err = tokio::time::timeout(Duration::from_secs(5), controller.exchange_code_for_token("c"))
        .await
        .expect("controller must give up on its own")
        .unwrap_err();

    assert!(matches!(err, SoundcheckError::TokenExchangeFailed(ref msg) if msg.contains("timed out")));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness(
        FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")),
        ScriptedExchanger::token("intermediary", "tok1"),
    );
    h.controller.set_access_token("tok1".into()).await.unwrap();
    h.store.store_pending(&PendingAuthorization::new("v".into(), "s".into())).await.unwrap();

    h.controller.logout().await.unwrap();
    h.controller.logout().await.unwrap();

    assert_eq!(h.controller.session(), soundcheck_domain::Session::default());
    assert!(h.store.load_access_token().await.unwrap().is_none());
    assert!(h.store.load_pending().await.unwrap().is_none());
    assert!(!h.api.has_token());
}

/// Logout still drops the pending verifier when the token entry cannot be
/// removed, and reports the storage failure.
#[tokio::test]
async fn test_logout_clears_pending_despite_token_failure() {
    let store = Arc::new(StuckTokenStore::default());
    let api = Arc::new(FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")));
    let controller = AuthFlowController::new(
        oauth(),
        store.clone(),
        api.clone(),
        Arc::new(ScriptedExchanger::token("intermediary", "tok1")),
    );
    controller.set_access_token("tok1".into()).await.unwrap();
    store.store_pending(&PendingAuthorization::new("v".into(), "s".into())).await.unwrap();

    let err = controller.logout().await.unwrap_err();

    assert!(matches!(err, SoundcheckError::Storage(_)));
    assert!(store.load_pending().await.unwrap().is_none());
    assert!(!controller.session().is_authenticated);
    assert!(!api.has_token());
}

#[tokio::test]
async fn test_initialize_restores_persisted_token() {
    let store = Arc::new(MemoryCredentialStore::with_access_token("tok1"));
    let api = Arc::new(FakeMusicApi::new().with_profile("tok1", profile("u1", "Ada")));
    let controller = AuthFlowController::new(
        oauth(),
        store,
        api.clone(),
        Arc::new(ScriptedExchanger::token("intermediary", "unused")),
    );
    let mut updates = controller.subscribe();

    let session = controller.initialize().await.unwrap();

    assert!(session.is_authenticated);
    assert!(!session.is_loading);
    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().is_authenticated);
    assert_eq!(api.current_token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn test_initialize_discards_rejected_token() {
    let store = Arc::new(MemoryCredentialStore::with_access_token("expired"));
    let controller = AuthFlowController::new(
        oauth(),
        store.clone(),
        Arc::new(FakeMusicApi::new()),
        Arc::new(ScriptedExchanger::token("intermediary", "unused")),
    );

    let session = controller.initialize().await.unwrap();

    assert!(!session.is_authenticated);
    assert!(!session.is_loading);
    assert!(store.load_access_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_initialize_without_token_is_signed_out() {
    let h = harness(FakeMusicApi::new(), ScriptedExchanger::token("intermediary", "tok1"));

    let session = h.controller.initialize().await.unwrap();

    assert_eq!(session, soundcheck_domain::Session::default());
    assert_eq!(h.api.profile_calls.load(Ordering::SeqCst), 0);
}
