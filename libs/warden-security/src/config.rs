//! Configuration for the token codec and token lifetimes.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::token::{TokenError, TokenType};

/// Default cipher transformation.
pub const DEFAULT_ALGORITHM: &str = "AES/ECB/PKCS5Padding";

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_owned()
}

/// Token codec configuration.
///
/// ```yaml
/// token_codec:
///   algorithm: "AES/CBC/PKCS5Padding"
///   key_size: 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenCodecConfig {
    /// Cipher transformation in `AES/<mode>/<padding>` form.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Key size in bits (128, 192 or 256). Unset means 128.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
}

impl Default for TokenCodecConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            key_size: None,
        }
    }
}

/// Upper bound for any configured token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Lifetimes of the tokens issued through the codec, in seconds.
///
/// Each lifetime must be positive and at most [`MAX_TOKEN_LIFETIME_SECS`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenLifetimes {
    pub access_secs: i64,
    pub refresh_secs: i64,
    /// Double-submit (`X-XSRF-TOKEN`) tokens.
    pub xsrf_secs: i64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_secs: 3 * 60 * 60,
            refresh_secs: 7 * 24 * 60 * 60,
            xsrf_secs: 8 * 60 * 60,
        }
    }
}

impl TokenLifetimes {
    /// # Errors
    /// Returns [`TokenError::Configuration`] if `access_secs` is out of bounds.
    pub fn access(&self) -> Result<Duration, TokenError> {
        bounded("access_secs", self.access_secs)
    }

    /// # Errors
    /// Returns [`TokenError::Configuration`] if `refresh_secs` is out of bounds.
    pub fn refresh(&self) -> Result<Duration, TokenError> {
        bounded("refresh_secs", self.refresh_secs)
    }

    /// # Errors
    /// Returns [`TokenError::Configuration`] if `xsrf_secs` is out of bounds.
    pub fn xsrf(&self) -> Result<Duration, TokenError> {
        bounded("xsrf_secs", self.xsrf_secs)
    }

    /// Lifetime of tokens of the given kind.
    ///
    /// # Errors
    /// Returns [`TokenError::Configuration`] if that lifetime is out of bounds.
    pub fn for_kind(&self, kind: TokenType) -> Result<Duration, TokenError> {
        match kind {
            TokenType::Access => self.access(),
            TokenType::Refresh => self.refresh(),
            TokenType::Xsrf => self.xsrf(),
        }
    }

    /// Check every lifetime at once, so bad configuration fails at startup
    /// rather than on the first issued token.
    ///
    /// # Errors
    /// Returns the first out-of-bounds lifetime as [`TokenError::Configuration`].
    pub fn validate(&self) -> Result<(), TokenError> {
        self.access()?;
        self.refresh()?;
        self.xsrf()?;
        Ok(())
    }
}

fn bounded(field: &str, secs: i64) -> Result<Duration, TokenError> {
    if secs <= 0 || secs > MAX_TOKEN_LIFETIME_SECS {
        return Err(TokenError::Configuration(format!(
            "{field} must be between 1 and {MAX_TOKEN_LIFETIME_SECS}, got {secs}"
        )));
    }
    Duration::try_seconds(secs)
        .ok_or_else(|| TokenError::Configuration(format!("{field} of {secs}s is out of range")))
}
