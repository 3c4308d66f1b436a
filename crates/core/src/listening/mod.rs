//! Listening statistics: the API port and composed reads

pub mod ports;
pub mod service;

pub use ports::MusicApi;
pub use service::ListeningService;
