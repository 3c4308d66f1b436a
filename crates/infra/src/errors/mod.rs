//! Infrastructure error handling
//!
//! Every external failure (HTTP transport, keychain, config parsing) is
//! converted into the shared `SoundcheckError` taxonomy before it leaves
//! this crate.

pub mod conversions;

pub use conversions::InfraError;
