//! Listening statistics service - composed reads over `MusicApi`

use std::sync::Arc;

use soundcheck_domain::{ListeningOverview, PagedResult, Result, TimeRange, Track};
use tracing::{debug, warn};

use super::ports::MusicApi;

/// Artists taken from the overview when seeding default recommendations
const DEFAULT_ARTIST_SEEDS: usize = 2;
/// Tracks taken from the overview when seeding default recommendations
const DEFAULT_TRACK_SEEDS: usize = 2;

/// Listening statistics service
pub struct ListeningService {
    api: Arc<dyn MusicApi>,
}

impl ListeningService {
    pub fn new(api: Arc<dyn MusicApi>) -> Self {
        Self { api }
    }

    /// Fetch top artists and top tracks concurrently
    ///
    /// Both legs must succeed; the first failure fails the whole read.
    pub async fn overview(&self, range: TimeRange, limit: u32) -> Result<ListeningOverview> {
        let (top_artists, top_tracks) = futures::try_join!(
            self.api.get_top_artists(range, limit),
            self.api.get_top_tracks(range, limit),
        )
        .map_err(|err| {
            warn!(error = %err, time_range = %range, "Listening overview failed");
            err
        })?;

        debug!(
            time_range = %range,
            artists = top_artists.items.len(),
            tracks = top_tracks.items.len(),
            "Fetched listening overview"
        );

        Ok(ListeningOverview { time_range: range, top_artists, top_tracks })
    }

    /// Recommendations seeded from the leading top artists and tracks
    ///
    /// An empty overview yields an empty page without calling the provider.
    pub async fn default_recommendations(
        &self,
        overview: &ListeningOverview,
        limit: u32,
    ) -> Result<PagedResult<Track>> {
        let seed_artists: Vec<String> = overview
            .top_artists
            .items
            .iter()
            .take(DEFAULT_ARTIST_SEEDS)
            .map(|artist| artist.id.clone())
            .collect();
        let seed_tracks: Vec<String> = overview
            .top_tracks
            .items
            .iter()
            .take(DEFAULT_TRACK_SEEDS)
            .map(|track| track.id.clone())
            .collect();

        if seed_artists.is_empty() && seed_tracks.is_empty() {
            return Ok(PagedResult::single(Vec::new(), limit));
        }

        self.api.get_recommendations(&seed_artists, &seed_tracks, limit).await
    }
}
