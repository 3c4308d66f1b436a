//! Session state published by the authorization flow

use serde::{Deserialize, Serialize};

use super::profile::Profile;

/// Authorization flow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    AwaitingRedirect,
    ExchangingCode,
    Authenticated,
}

crate::impl_wire_str_conversions!(AuthState {
    Unauthenticated => "unauthenticated",
    AwaitingRedirect => "awaiting_redirect",
    ExchangingCode => "exchanging_code",
    Authenticated => "authenticated",
});

/// Snapshot of the current authentication session
///
/// `user` is only ever set together with the token it was fetched with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub user: Option<Profile>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub state: AuthState,
}

impl Session {
    /// Initial state before a persisted token has been looked at.
    #[must_use]
    pub fn loading() -> Self {
        Self { is_loading: true, ..Self::default() }
    }

    #[must_use]
    pub fn authenticated(access_token: String, user: Profile) -> Self {
        Self {
            access_token: Some(access_token),
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            state: AuthState::Authenticated,
        }
    }

    /// Cleared session in the given pre-authentication state.
    #[must_use]
    pub fn pending(state: AuthState) -> Self {
        Self { state, ..Self::default() }
    }
}
