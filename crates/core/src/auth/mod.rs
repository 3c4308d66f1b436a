//! Authorization-code + PKCE flow and session ownership

pub mod controller;
pub mod ports;

pub use controller::AuthFlowController;
pub use ports::{Navigator, TokenExchanger};
