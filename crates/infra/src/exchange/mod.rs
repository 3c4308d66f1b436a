//! Code-for-token exchange paths

pub mod token_endpoint;

pub use token_endpoint::TokenEndpointExchanger;
