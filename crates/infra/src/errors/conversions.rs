//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use soundcheck_common::auth::CredentialStoreError;
use soundcheck_domain::SoundcheckError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SoundcheckError);

impl From<InfraError> for SoundcheckError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SoundcheckError> for InfraError {
    fn from(value: SoundcheckError) -> Self {
        InfraError(value)
    }
}

/// Credential stores report through their own error type.
impl From<InfraError> for CredentialStoreError {
    fn from(value: InfraError) -> Self {
        match value.0 {
            SoundcheckError::Storage(message) => CredentialStoreError::Backend(message),
            other => CredentialStoreError::Backend(other.to_string()),
        }
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSoundcheckError {
    fn into_soundcheck(self) -> SoundcheckError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → SoundcheckError */
/* -------------------------------------------------------------------------- */

impl IntoSoundcheckError for KeyringError {
    fn into_soundcheck(self) -> SoundcheckError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        match self {
            NoEntry => SoundcheckError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                SoundcheckError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => SoundcheckError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                SoundcheckError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => SoundcheckError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                SoundcheckError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                SoundcheckError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => SoundcheckError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_soundcheck())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SoundcheckError */
/* -------------------------------------------------------------------------- */

impl IntoSoundcheckError for HttpError {
    fn into_soundcheck(self) -> SoundcheckError {
        if self.is_timeout() {
            return SoundcheckError::request_failed("HTTP request timed out");
        }

        if self.is_connect() {
            return SoundcheckError::request_failed("HTTP connection failure");
        }

        if self.is_decode() {
            return SoundcheckError::request_failed(format!("undecodable response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => SoundcheckError::Unauthenticated,
                429 => SoundcheckError::TooManyRequests { retry_after_secs: None },
                400 => SoundcheckError::InvalidRequest(message),
                _ => SoundcheckError::RequestFailed { status: Some(code), message },
            };
        }

        SoundcheckError::request_failed(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_soundcheck())
    }
}

/* -------------------------------------------------------------------------- */
/* Config document parsing → SoundcheckError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(SoundcheckError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(SoundcheckError::Config(format!("Invalid JSON format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
