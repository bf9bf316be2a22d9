//! Encrypted, time-bounded tokens.
//!
//! A [`TokenCodec`] turns [`TokenData`] into an opaque Base64 string and back.
//! The key lives only in process memory, so tokens do not survive a restart.

mod cipher;
mod codec;
mod data;
mod envelope;
mod error;

pub use cipher::{CipherMode, CipherSpec, KeySize, Padding};
pub use codec::TokenCodec;
pub use data::{Token, TokenData, TokenType};
pub use envelope::TOKEN_FORMAT_VERSION;
pub use error::TokenError;
