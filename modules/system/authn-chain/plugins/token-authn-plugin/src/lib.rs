#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Token Authentication Plugin
//!
//! Accepts `Authorization: Bearer` tokens (and pre-authenticated identities
//! backed by a token) that were issued by the process [`TokenCodec`].
//! Expiry is the only invalidation mechanism.
//!
//! ## Configuration
//!
//! ```yaml
//! token_authn_plugin:
//!   id: "token"
//!   accept_pre_authenticated: true
//!   lifetimes:
//!     access_secs: 10800
//!     refresh_secs: 604800
//! ```
//!
//! [`TokenCodec`]: warden_security::TokenCodec

pub mod config;
pub mod domain;
pub mod module;

pub use domain::Service;
pub use module::TokenAuthnPlugin;
