use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::TokenError;

/// Payload carried inside an encrypted token.
///
/// `valid_before` is always `created + lifetime`; validity is a pure function
/// of wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// Username the token was issued to.
    pub user: String,
    /// What the token may be used for. Sealed with the rest of the payload.
    pub kind: TokenType,
    pub created: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
    /// Random salt so two tokens issued in the same instant differ.
    pub nonce: i64,
}

impl TokenData {
    /// Issue data for `user` valid for `lifetime` from now.
    ///
    /// # Errors
    /// Returns [`TokenError::Configuration`] if `lifetime` pushes the expiry
    /// past the representable range.
    pub fn new(user: &str, kind: TokenType, lifetime: Duration) -> Result<Self, TokenError> {
        Self::issued_at(user, kind, Utc::now(), lifetime)
    }

    /// Issue data with an explicit creation instant.
    ///
    /// # Errors
    /// Same as [`TokenData::new`].
    pub fn issued_at(
        user: &str,
        kind: TokenType,
        created: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let created = created.trunc_subsecs(3);
        let valid_before = created.checked_add_signed(lifetime).ok_or_else(|| {
            TokenError::Configuration(format!(
                "token lifetime of {}s is out of range",
                lifetime.num_seconds()
            ))
        })?;
        Ok(Self {
            user: user.to_owned(),
            kind,
            created,
            valid_before,
            nonce: rand::random::<i64>(),
        })
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// `true` while `now` is strictly before `valid_before`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_before
    }

    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.valid_before - self.created
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    /// Double-submit token echoed back in `X-XSRF-TOKEN`.
    Xsrf,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
            Self::Xsrf => f.write_str("xsrf"),
        }
    }
}

/// An issued token: the opaque string handed to clients plus what it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: Uuid,
    pub kind: TokenType,
    /// Base64 form sent over the wire.
    pub data: String,
    /// Raw ciphertext behind `data`.
    pub bytes: Vec<u8>,
    pub metadata: TokenData,
}

impl Token {
    #[must_use]
    pub fn user(&self) -> &str {
        &self.metadata.user
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.metadata.is_valid()
    }
}
