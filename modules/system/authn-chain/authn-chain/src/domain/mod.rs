//! Domain layer for the authentication chain.

pub mod chain;
pub mod client;
pub mod lockout;
pub mod service;

pub use chain::{ChainEntry, ChainSnapshot};
pub use service::AuthnChain;
