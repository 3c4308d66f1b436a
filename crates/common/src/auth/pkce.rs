//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 with the S256 method. The verifier is drawn from the
//! alphanumeric subset of the unreserved alphabet; the challenge is
//! BASE64URL-NOPAD(SHA256(ASCII(verifier))).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Shortest verifier RFC 7636 allows
pub const MIN_VERIFIER_LENGTH: usize = 43;
/// Longest verifier RFC 7636 allows
pub const MAX_VERIFIER_LENGTH: usize = 128;
/// Length used when callers have no preference
pub const DEFAULT_VERIFIER_LENGTH: usize = 128;

/// Generate a random code verifier of exactly `length` characters
///
/// Characters are drawn uniformly from `[A-Za-z0-9]` using the thread-local
/// CSPRNG. `length` is clamped into `43..=128`.
#[must_use]
pub fn generate_verifier(length: usize) -> String {
    let length = length.clamp(MIN_VERIFIER_LENGTH, MAX_VERIFIER_LENGTH);
    rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Derive the S256 code challenge for a verifier
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier)))
/// without padding.
#[must_use]
pub fn derive_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token
///
/// 32 random bytes, base64url encoded (43 characters). Sent in the
/// authorization request and echoed back on the callback.
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// PKCE pair for one login attempt
///
/// The verifier stays local until the token exchange; the challenge goes out
/// in the authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generate a new pair with a verifier of `length` characters
    ///
    /// # Examples
    /// ```
    /// use soundcheck_common::auth::pkce::{derive_challenge, PkcePair};
    ///
    /// let pair = PkcePair::generate(64);
    /// assert_eq!(pair.verifier.len(), 64);
    /// assert_eq!(pair.challenge, derive_challenge(&pair.verifier));
    /// ```
    #[must_use]
    pub fn generate(length: usize) -> Self {
        Self::from_verifier(generate_verifier(length))
    }

    /// Build a pair around an existing verifier.
    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let challenge = derive_challenge(&verifier);
        Self { verifier, challenge }
    }

    /// Get the challenge method (always "S256")
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

impl Default for PkcePair {
    fn default() -> Self {
        Self::generate(DEFAULT_VERIFIER_LENGTH)
    }
}
