//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Persisted state keys (fixed, shared with the browser build)
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "spotify_access_token";
pub const STORAGE_KEY_CODE_VERIFIER: &str = "code_verifier";

// Provider endpoints
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

pub const DEFAULT_SCOPES: [&str; 4] =
    ["user-read-private", "user-read-email", "user-top-read", "user-read-recently-played"];

// Provider paging limits
pub const MAX_PAGE_SIZE: u32 = 50;
pub const MAX_RECOMMENDATION_LIMIT: u32 = 100;
pub const MAX_RECOMMENDATION_SEEDS: usize = 5;
pub const DEFAULT_TOP_ITEMS_LIMIT: u32 = 20;
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 20;

// Timeouts
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
