//! Spotify Web API client
//!
//! Holds zero or one bearer token and fails fast with `Unauthenticated`
//! when a fetch is attempted without one.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use soundcheck_core::MusicApi;
use soundcheck_domain::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, MAX_PAGE_SIZE, MAX_RECOMMENDATION_LIMIT,
    MAX_RECOMMENDATION_SEEDS,
};
use soundcheck_domain::{
    ApiSettings, Artist, CursorPage, PagedResult, PlayHistory, Profile, RecommendationSeeds,
    Recommendations, Result, SoundcheckError, TimeRange, Track,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::http::HttpClient;

/// Configuration for the Spotify client
#[derive(Debug, Clone)]
pub struct SpotifyClientConfig {
    /// Base URL for the Web API (e.g., "https://api.spotify.com/v1")
    pub base_url: String,
    /// Timeout for each request
    pub timeout: Duration,
}

impl Default for SpotifyClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

impl From<&ApiSettings> for SpotifyClientConfig {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Error body shape used by the Web API
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http: HttpClient,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl SpotifyClient {
    /// Create a new client without a token
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Config` if the base URL is not absolute, or
    /// the error from building the underlying HTTP client.
    pub fn new(config: SpotifyClientConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            SoundcheckError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e))
        })?;

        let http = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn bearer(&self) -> Result<String> {
        self.token.read().clone().ok_or(SoundcheckError::Unauthenticated)
    }

    /// Execute an authenticated GET and decode the JSON body
    #[instrument(skip(self, query), fields(path = %path))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.bearer()?;
        let url = format!("{}{}", self.base_url, path);

        debug!(params = query.len(), "GET request");

        let request = self.http.request(Method::GET, &url).bearer_auth(token).query(query);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let err = map_status_error(status, retry_after, &body);
            warn!(status = status.as_u16(), error = err.label(), "GET request rejected");
            return Err(err);
        }

        let result = response
            .json::<T>()
            .await
            .map_err(|e| SoundcheckError::request_failed(format!("Failed to parse response: {e}")))?;

        debug!("GET request successful");
        Ok(result)
    }
}

fn clamp_page_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

/// `Retry-After` in delta-seconds; HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

fn map_status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> SoundcheckError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )
        });

    match status {
        StatusCode::UNAUTHORIZED => SoundcheckError::Unauthenticated,
        StatusCode::TOO_MANY_REQUESTS => {
            SoundcheckError::TooManyRequests { retry_after_secs: retry_after }
        }
        StatusCode::BAD_REQUEST => SoundcheckError::InvalidRequest(message),
        _ => SoundcheckError::RequestFailed { status: Some(status.as_u16()), message },
    }
}

#[async_trait]
impl MusicApi for SpotifyClient {
    fn set_token(&self, token: Option<String>) {
        let present = token.is_some();
        *self.token.write() = token;
        debug!(present, "API client credential updated");
    }

    fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    async fn get_profile(&self) -> Result<Profile> {
        let profile: Profile = self.get_json("/me", &[]).await?;
        info!(user_id = %profile.id, "Fetched current user profile");
        Ok(profile)
    }

    async fn get_top_artists(&self, range: TimeRange, limit: u32) -> Result<PagedResult<Artist>> {
        let query = [("time_range", range.to_string()), ("limit", clamp_page_limit(limit).to_string())];
        self.get_json("/me/top/artists", &query).await
    }

    async fn get_top_tracks(&self, range: TimeRange, limit: u32) -> Result<PagedResult<Track>> {
        let query = [("time_range", range.to_string()), ("limit", clamp_page_limit(limit).to_string())];
        self.get_json("/me/top/tracks", &query).await
    }

    async fn get_recommendations(
        &self,
        seed_artists: &[String],
        seed_tracks: &[String],
        limit: u32,
    ) -> Result<PagedResult<Track>> {
        let limit = limit.clamp(1, MAX_RECOMMENDATION_LIMIT);
        let seeds = RecommendationSeeds::capped(seed_artists, seed_tracks, MAX_RECOMMENDATION_SEEDS);

        if seeds.len() < seed_artists.len() + seed_tracks.len() {
            debug!(
                requested = seed_artists.len() + seed_tracks.len(),
                kept = seeds.len(),
                "Recommendation seeds capped"
            );
        }

        let mut query = vec![("limit", limit.to_string())];
        if !seeds.artists.is_empty() {
            query.push(("seed_artists", seeds.artists.join(",")));
        }
        if !seeds.tracks.is_empty() {
            query.push(("seed_tracks", seeds.tracks.join(",")));
        }

        let recommendations: Recommendations = self.get_json("/recommendations", &query).await?;
        Ok(recommendations.into_page(limit))
    }

    async fn get_recently_played(&self, limit: u32) -> Result<CursorPage<PlayHistory>> {
        let query = [("limit", clamp_page_limit(limit).to_string())];
        self.get_json("/me/player/recently-played", &query).await
    }
}
