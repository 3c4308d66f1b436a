//! Assembles the controller from configuration
//!
//! The one place where concrete adapters are chosen; everything downstream
//! sees only the core ports.

use std::sync::Arc;
use std::time::Duration;

use soundcheck_common::auth::{CredentialStore, OAuthConfig};
use soundcheck_core::{AuthFlowController, ListeningService, MusicApi, TokenExchanger};
use soundcheck_domain::{Config, Result};
use tracing::info;

use crate::api::{SpotifyClient, SpotifyClientConfig};
use crate::exchange::TokenEndpointExchanger;
use crate::storage::credential_store;

/// Build a controller wired to the Web API, the configured exchange paths
/// and the configured credential store
///
/// # Errors
///
/// Returns `SoundcheckError::Config` if the configuration fails validation
/// or an endpoint URL is malformed, and `SoundcheckError::Storage` if the
/// credential store cannot be opened.
pub fn build_controller(config: &Config) -> Result<AuthFlowController> {
    build_controller_with_store(config, credential_store(&config.storage)?)
}

/// Same as [`build_controller`] with a caller-supplied store
///
/// # Errors
///
/// See [`build_controller`].
pub fn build_controller_with_store(
    config: &Config,
    store: Arc<dyn CredentialStore>,
) -> Result<AuthFlowController> {
    config.validate()?;

    let oauth = OAuthConfig::new(
        config.oauth.client_id.clone(),
        config.oauth.redirect_uri.clone(),
        config.oauth.authorize_url.clone(),
        config.oauth.scopes.clone(),
    )
    .with_show_dialog(config.oauth.show_dialog);

    let timeout = Duration::from_secs(config.exchange.timeout_secs);
    let api: Arc<dyn MusicApi> =
        Arc::new(SpotifyClient::new(SpotifyClientConfig::from(&config.api))?);
    let primary: Arc<dyn TokenExchanger> =
        Arc::new(TokenEndpointExchanger::new("intermediary", &config.exchange.endpoint, timeout)?);

    let mut controller =
        AuthFlowController::new(oauth, store, api, primary).with_exchange_timeout(timeout);

    if let Some(fallback) = &config.exchange.fallback_endpoint {
        let fallback: Arc<dyn TokenExchanger> =
            Arc::new(TokenEndpointExchanger::new("fallback", fallback, timeout)?);
        controller = controller.with_fallback_exchanger(fallback);
    }

    info!(
        fallback = config.exchange.fallback_endpoint.is_some(),
        storage = %config.storage.backend,
        "Auth flow controller assembled"
    );
    Ok(controller)
}

/// Listening reads sharing the controller's API client
pub fn listening_service(controller: &AuthFlowController) -> ListeningService {
    ListeningService::new(controller.api())
}
