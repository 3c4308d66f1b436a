//! Domain types and models
//!
//! Provider payloads are modelled loosely: fields the provider may omit
//! depending on scope or object shape are optional or defaulted.

pub mod catalog;
pub mod paging;
pub mod profile;
pub mod recommendations;
pub mod session;

use serde::{Deserialize, Serialize};

pub use catalog::{Album, Artist, Track};
pub use paging::{CursorPage, Cursors, PagedResult, PlayHistory, TimeRange};
pub use profile::{ExternalUrls, Followers, Image, Profile};
pub use recommendations::{RecommendationSeed, RecommendationSeeds, Recommendations};
pub use session::{AuthState, Session};

/// Top artists and top tracks for one time window, read together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningOverview {
    pub time_range: TimeRange,
    pub top_artists: PagedResult<Artist>,
    pub top_tracks: PagedResult<Track>,
}
