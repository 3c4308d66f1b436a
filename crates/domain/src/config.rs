//! Configuration structures
//!
//! Every section has serde defaults so a partial file (or none at all, with
//! the environment filling the gaps) still produces a complete `Config`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_AUTHORIZE_URL,
    DEFAULT_EXCHANGE_TIMEOUT_SECS, DEFAULT_SCOPES, DEFAULT_TOKEN_URL,
};
use crate::errors::{Result, SoundcheckError};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oauth: OAuthSettings,
    pub exchange: ExchangeSettings,
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
}

/// Authorization request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub scopes: Vec<String>,
    /// Force the provider's consent dialog even for returning users.
    pub show_dialog: bool,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: String::new(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            show_dialog: false,
        }
    }
}

/// Code-for-token exchange paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// Trusted intermediary endpoint (primary path)
    pub endpoint: String,
    /// Alternate path, tried once when the primary fails
    pub fallback_endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            fallback_endpoint: None,
            timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE_URL.to_string(), timeout_secs: DEFAULT_API_TIMEOUT_SECS }
    }
}

/// Where the access token and pending verifier live between runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keychain,
    Memory,
}

crate::impl_wire_str_conversions!(StorageBackend {
    File => "file",
    Keychain => "keychain",
    Memory => "memory",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: String,
    pub keychain_service: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "soundcheck-credentials.json".to_string(),
            keychain_service: "soundcheck".to_string(),
        }
    }
}

/// Token-exchange intermediary settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// The single browser origin allowed through CORS
    pub allowed_origin: String,
    /// Provider token endpoint the intermediary forwards to
    pub token_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8888".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Config {
    /// Checks the settings the auth flow cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Config` naming the first missing or
    /// malformed field.
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(SoundcheckError::Config("oauth.client_id is required".into()));
        }
        if self.oauth.redirect_uri.trim().is_empty() {
            return Err(SoundcheckError::Config("oauth.redirect_uri is required".into()));
        }
        if self.oauth.scopes.is_empty() {
            return Err(SoundcheckError::Config("oauth.scopes must not be empty".into()));
        }
        if self.exchange.endpoint.trim().is_empty() {
            return Err(SoundcheckError::Config("exchange.endpoint is required".into()));
        }
        if self.exchange.timeout_secs == 0 {
            return Err(SoundcheckError::Config("exchange.timeout_secs must be > 0".into()));
        }
        if self.exchange.fallback_endpoint.as_deref() == Some(self.exchange.endpoint.as_str()) {
            return Err(SoundcheckError::Config(
                "exchange.fallback_endpoint must differ from exchange.endpoint".into(),
            ));
        }
        Ok(())
    }

    /// Checks only what the token-exchange intermediary needs.
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Config` when the bind address, origin or
    /// token URL is empty.
    pub fn validate_server(&self) -> Result<()> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(SoundcheckError::Config("server.bind_addr is required".into()));
        }
        if self.server.allowed_origin.trim().is_empty() {
            return Err(SoundcheckError::Config("server.allowed_origin is required".into()));
        }
        if self.server.token_url.trim().is_empty() {
            return Err(SoundcheckError::Config("server.token_url is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.oauth.client_id = "client".into();
        config.oauth.redirect_uri = "http://localhost:5173/callback".into();
        config.exchange.endpoint = "http://localhost:8888/api/token".into();
        config
    }

    #[test]
    fn defaults_carry_provider_urls_and_scopes() {
        let config = Config::default();
        assert_eq!(config.oauth.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.exchange.timeout_secs, 15);
        assert!(config.oauth.scopes.iter().any(|s| s == "user-top-read"));
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_requires_client_id() {
        let mut config = valid();
        config.oauth.client_id = "  ".into();
        assert!(matches!(config.validate(), Err(SoundcheckError::Config(msg)) if msg.contains("client_id")));
    }

    #[test]
    fn validate_rejects_fallback_equal_to_primary() {
        let mut config = valid();
        config.exchange.fallback_endpoint = Some(config.exchange.endpoint.clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"oauth":{"client_id":"abc"},"storage":{"backend":"memory"}}"#)
                .unwrap();
        assert_eq!(config.oauth.client_id, "abc");
        assert_eq!(config.oauth.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn storage_backend_parses_from_str() {
        assert_eq!("Keychain".parse::<StorageBackend>().unwrap(), StorageBackend::Keychain);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
