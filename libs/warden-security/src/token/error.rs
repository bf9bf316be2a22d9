use chrono::{DateTime, Utc};

/// Errors raised by the token codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The codec could not be built from its configuration.
    #[error("invalid token codec configuration: {0}")]
    Configuration(String),

    #[error("token encryption failed: {0}")]
    EncryptionFailed(String),

    /// The string is not a token produced by this codec.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired at {valid_before}")]
    Expired { valid_before: DateTime<Utc> },
}

impl TokenError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }
}
