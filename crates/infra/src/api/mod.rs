//! Spotify Web API client
//!
//! Bearer-authenticated typed accessors behind the core `MusicApi` port.
//!
//! # Architecture
//!
//! - Uses the shared `HttpClient` (no direct reqwest client construction)
//! - Single attempt per call; retry policy belongs to the caller
//! - Provider status codes normalized into `SoundcheckError`
//! - Token and query strings are never logged

pub mod client;

pub use client::{SpotifyClient, SpotifyClientConfig};
