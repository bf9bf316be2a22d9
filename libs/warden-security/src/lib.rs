//! Warden security primitives.
//!
//! - [`SecurityContext`]: the principal resolved for one request
//! - [`TokenCodec`]: encrypts [`TokenData`] into opaque, time-bounded tokens
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod config;
pub mod context;
pub mod token;

pub use config::{MAX_TOKEN_LIFETIME_SECS, TokenCodecConfig, TokenLifetimes};
pub use context::SecurityContext;
pub use token::{
    CipherMode, CipherSpec, KeySize, Padding, TOKEN_FORMAT_VERSION, Token, TokenCodec, TokenData,
    TokenError, TokenType,
};
