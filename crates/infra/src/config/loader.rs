//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Environment variables that are set override file values
//!
//! ## Environment Variables
//! Required for [`load_from_env`]:
//! - `SOUNDCHECK_CLIENT_ID`: OAuth client id
//! - `SOUNDCHECK_REDIRECT_URI`: Registered redirect URI
//! - `SOUNDCHECK_EXCHANGE_URL`: Token-exchange intermediary endpoint
//!
//! Optional:
//! - `SOUNDCHECK_AUTHORIZE_URL`: Provider authorize endpoint
//! - `SOUNDCHECK_SCOPES`: Space- or comma-separated scopes
//! - `SOUNDCHECK_SHOW_DIALOG`: Force the consent dialog (true/false)
//! - `SOUNDCHECK_EXCHANGE_FALLBACK_URL`: Alternate exchange path
//! - `SOUNDCHECK_EXCHANGE_TIMEOUT_SECS`: Per-path exchange timeout
//! - `SOUNDCHECK_API_BASE_URL`: Web API base URL
//! - `SOUNDCHECK_API_TIMEOUT_SECS`: Web API request timeout
//! - `SOUNDCHECK_STORAGE_BACKEND`: `file`, `keychain` or `memory`
//! - `SOUNDCHECK_STORAGE_PATH`: Credential file path
//! - `SOUNDCHECK_KEYCHAIN_SERVICE`: Keychain service name
//! - `SOUNDCHECK_BIND_ADDR`: Intermediary listen address
//! - `SOUNDCHECK_ALLOWED_ORIGIN`: Intermediary CORS origin
//! - `SOUNDCHECK_TOKEN_URL`: Provider token endpoint used by the intermediary
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./soundcheck.json` or `./soundcheck.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use soundcheck_domain::{Config, Result, SoundcheckError, StorageBackend};

use crate::errors::InfraError;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SoundcheckError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - An environment override has an invalid value
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            let mut config = load_from_file(None)?;
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

/// Load what the token-exchange intermediary needs
///
/// A config file is optional here: server settings all have defaults, and
/// environment variables override them.
///
/// # Errors
/// Returns `SoundcheckError::Config` if a probed file is invalid, an
/// override has an invalid value, or the resulting server section fails
/// validation.
pub fn load_server() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config)?;
    config.validate_server()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// The required variables must be present; optional ones fall back to
/// defaults.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `SoundcheckError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.oauth.client_id = env_var("SOUNDCHECK_CLIENT_ID")?;
    config.oauth.redirect_uri = env_var("SOUNDCHECK_REDIRECT_URI")?;
    config.exchange.endpoint = env_var("SOUNDCHECK_EXCHANGE_URL")?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overlay every `SOUNDCHECK_*` variable that is set onto `config`
///
/// # Errors
/// Returns `SoundcheckError::Config` if a numeric or enum variable cannot be
/// parsed.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(v) = env_opt("SOUNDCHECK_CLIENT_ID") {
        config.oauth.client_id = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_REDIRECT_URI") {
        config.oauth.redirect_uri = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_AUTHORIZE_URL") {
        config.oauth.authorize_url = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_SCOPES") {
        config.oauth.scopes = split_scopes(&v);
    }
    config.oauth.show_dialog = env_bool("SOUNDCHECK_SHOW_DIALOG", config.oauth.show_dialog);

    if let Some(v) = env_opt("SOUNDCHECK_EXCHANGE_URL") {
        config.exchange.endpoint = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_EXCHANGE_FALLBACK_URL") {
        config.exchange.fallback_endpoint = Some(v);
    }
    if let Some(v) = env_opt("SOUNDCHECK_EXCHANGE_TIMEOUT_SECS") {
        config.exchange.timeout_secs = v.parse::<u64>().map_err(|e| {
            SoundcheckError::Config(format!("Invalid exchange timeout: {}", e))
        })?;
    }

    if let Some(v) = env_opt("SOUNDCHECK_API_BASE_URL") {
        config.api.base_url = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_API_TIMEOUT_SECS") {
        config.api.timeout_secs = v
            .parse::<u64>()
            .map_err(|e| SoundcheckError::Config(format!("Invalid API timeout: {}", e)))?;
    }

    if let Some(v) = env_opt("SOUNDCHECK_STORAGE_BACKEND") {
        config.storage.backend = v.parse::<StorageBackend>().map_err(|_| {
            SoundcheckError::Config(format!("Invalid storage backend: {}", v))
        })?;
    }
    if let Some(v) = env_opt("SOUNDCHECK_STORAGE_PATH") {
        config.storage.path = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_KEYCHAIN_SERVICE") {
        config.storage.keychain_service = v;
    }

    if let Some(v) = env_opt("SOUNDCHECK_BIND_ADDR") {
        config.server.bind_addr = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_ALLOWED_ORIGIN") {
        config.server.allowed_origin = v;
    }
    if let Some(v) = env_opt("SOUNDCHECK_TOKEN_URL") {
        config.server.token_url = v;
    }

    Ok(())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `SoundcheckError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SoundcheckError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SoundcheckError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SoundcheckError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SoundcheckError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from)?,
        "json" => serde_json::from_str(contents).map_err(InfraError::from)?,
        _ => {
            return Err(SoundcheckError::Config(format!(
                "Unsupported config format: {}",
                extension
            )))
        }
    };
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./soundcheck.{json,toml}`,
///    `./config.{json,toml}`)
/// 2. Parent directory
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend(candidates_in(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("soundcheck.json"),
        dir.join("soundcheck.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `SoundcheckError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        SoundcheckError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty environment variable, if set
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
