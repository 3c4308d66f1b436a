//! Recommendation seeds and results

use serde::{Deserialize, Serialize};

use super::catalog::Track;
use super::paging::PagedResult;

/// Seed identifiers sent to `GET /recommendations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSeeds {
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
}

impl RecommendationSeeds {
    /// Caps the combined seed count at `max_seeds`.
    ///
    /// Artists take priority: tracks are dropped first, then artists, and
    /// the relative order inside each list is kept.
    #[must_use]
    pub fn capped(artists: &[String], tracks: &[String], max_seeds: usize) -> Self {
        let artist_count = artists.len().min(max_seeds);
        let track_count = max_seeds.saturating_sub(artist_count).min(tracks.len());
        Self {
            artists: artists[..artist_count].to_vec(),
            tracks: tracks[..track_count].to_vec(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artists.len() + self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.tracks.is_empty()
    }
}

/// Per-seed pool sizes reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSeed {
    pub id: String,
    #[serde(rename = "type")]
    pub seed_type: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub initial_pool_size: u32,
    #[serde(default)]
    pub after_filtering_size: u32,
    #[serde(default)]
    pub after_relinking_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub seeds: Vec<RecommendationSeed>,
}

impl Recommendations {
    /// Presents the result in the same paged shape as top items.
    #[must_use]
    pub fn into_page(self, limit: u32) -> PagedResult<Track> {
        PagedResult::single(self.tracks, limit)
    }
}
