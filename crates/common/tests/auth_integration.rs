//! Integration tests for auth module
//!
//! Tests the PKCE login preparation and callback handoff as a caller sees
//! them through the public API.

#![cfg(feature = "runtime")]

use soundcheck_common::auth::{
    derive_challenge, generate_state, parse_callback, CallbackOutcome, CredentialStore,
    MemoryCredentialStore, OAuthConfig, PendingAuthorization, PkcePair, TokenExchangeRequest,
};

fn config() -> OAuthConfig {
    OAuthConfig::new(
        "client-abc".to_string(),
        "http://localhost:5173/callback".to_string(),
        "https://accounts.spotify.com/authorize".to_string(),
        vec![
            "user-read-private".to_string(),
            "user-read-email".to_string(),
            "user-top-read".to_string(),
        ],
    )
}

/// Validates that a login attempt persists what the callback later needs.
///
/// # Test Steps
/// 1. Generate a PKCE pair and state, store them as the pending
///    authorization
/// 2. Build the authorize URL and check it carries the challenge and state
/// 3. Simulate the provider redirect with the same state
/// 4. Build the exchange request from the callback code and stored verifier
#[tokio::test(flavor = "multi_thread")]
async fn test_login_preparation_and_callback_handoff() {
    let store = MemoryCredentialStore::new();
    let pkce = PkcePair::default();
    let state = generate_state();

    store
        .store_pending(&PendingAuthorization::new(pkce.verifier.clone(), state.clone()))
        .await
        .expect("store pending");

    let url = config().authorization_url(&pkce, &state);
    assert!(url.contains(&format!("code_challenge={}", pkce.challenge)));
    assert!(url.contains(&format!("state={}", urlencoding_safe(&state))));

    let callback = format!("http://localhost:5173/callback?code=abc123&state={state}");
    let outcome = parse_callback(&callback).expect("parse callback");
    let CallbackOutcome::Code { code, state: returned_state } = outcome else {
        panic!("expected code outcome, got {outcome:?}");
    };

    let pending = store.load_pending().await.expect("load").expect("pending present");
    assert_eq!(returned_state.as_deref(), Some(pending.state.as_str()));

    let request = TokenExchangeRequest {
        authorization_code: code,
        code_verifier: pending.verifier.clone(),
        redirect_uri: config().redirect_uri,
        client_id: config().client_id,
    };
    assert_eq!(request.authorization_code, "abc123");
    assert_eq!(derive_challenge(&request.code_verifier), pkce.challenge);
}

/// Validates that a second login invalidates the first login's verifier.
///
/// # Test Steps
/// 1. Store a pending authorization for login #1
/// 2. Store a pending authorization for login #2
/// 3. A callback carrying login #1's state no longer matches the stored
///    state
#[tokio::test(flavor = "multi_thread")]
async fn test_second_login_supersedes_first() {
    let store = MemoryCredentialStore::new();
    let first = PendingAuthorization::new(PkcePair::default().verifier, generate_state());
    let second = PendingAuthorization::new(PkcePair::default().verifier, generate_state());

    store.store_pending(&first).await.expect("store first");
    store.store_pending(&second).await.expect("store second");

    let callback = format!("/callback?code=c1&state={}", first.state);
    let CallbackOutcome::Code { state, .. } = parse_callback(&callback).expect("parse") else {
        panic!("expected code outcome");
    };
    let pending = store.load_pending().await.expect("load").expect("pending");
    assert_ne!(state.as_deref(), Some(pending.state.as_str()));
    assert_eq!(pending.verifier, second.verifier);
}

// Base64url state tokens only contain unreserved characters, so URL encoding
// leaves them untouched.
fn urlencoding_safe(state: &str) -> &str {
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    state
}
