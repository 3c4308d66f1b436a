//! Port interface for the listening-statistics API

use async_trait::async_trait;
use soundcheck_domain::{
    Artist, CursorPage, PagedResult, PlayHistory, Profile, Result, TimeRange, Track,
};

/// Bearer-authenticated access to the provider's user endpoints
///
/// Implementations hold zero or one token. Every fetch fails with
/// `SoundcheckError::Unauthenticated` while no token is set.
#[async_trait]
pub trait MusicApi: Send + Sync {
    /// Replace (or with `None`, drop) the bearer token
    fn set_token(&self, token: Option<String>);

    fn has_token(&self) -> bool;

    /// `GET /me`
    async fn get_profile(&self) -> Result<Profile>;

    /// `GET /me/top/artists`; `limit` is clamped to 1..=50
    async fn get_top_artists(&self, range: TimeRange, limit: u32) -> Result<PagedResult<Artist>>;

    /// `GET /me/top/tracks`; `limit` is clamped to 1..=50
    async fn get_top_tracks(&self, range: TimeRange, limit: u32) -> Result<PagedResult<Track>>;

    /// `GET /recommendations`
    ///
    /// At most 5 seeds are sent; tracks are dropped before artists. `limit`
    /// is clamped to 1..=100.
    async fn get_recommendations(
        &self,
        seed_artists: &[String],
        seed_tracks: &[String],
        limit: u32,
    ) -> Result<PagedResult<Track>>;

    /// `GET /me/player/recently-played`; `limit` is clamped to 1..=50
    async fn get_recently_played(&self, limit: u32) -> Result<CursorPage<PlayHistory>>;
}
