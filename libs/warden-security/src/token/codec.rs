use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use rand::RngCore;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::cipher::{BLOCK_LEN, CipherSpec, KeySize, Padding};
use super::data::{Token, TokenData, TokenType};
use super::envelope;
use super::error::TokenError;
use crate::config::TokenCodecConfig;

/// Symmetric codec between [`TokenData`] and opaque Base64 strings.
///
/// The key is drawn from the OS RNG at construction and never leaves the
/// process. Every call builds its own cipher instance, so a codec can be
/// shared freely across tasks.
pub struct TokenCodec {
    spec: CipherSpec,
    key_size: KeySize,
    key: Zeroizing<Vec<u8>>,
    iv: Vec<u8>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("spec", &self.spec)
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec with a fresh random key.
    ///
    /// # Errors
    /// Returns [`TokenError::Configuration`] when the algorithm or key size is
    /// not supported.
    pub fn new(config: &TokenCodecConfig) -> Result<Self, TokenError> {
        let spec: CipherSpec = config.algorithm.parse()?;
        let key_size = KeySize::from_bits(config.key_size)?;

        let mut rng = rand::rng();
        let mut key = Zeroizing::new(vec![0u8; key_size.key_len()]);
        rng.fill_bytes(key.as_mut_slice());

        let iv = if spec.mode.needs_iv() {
            let mut iv = vec![0u8; BLOCK_LEN];
            rng.fill_bytes(&mut iv);
            iv
        } else {
            Vec::new()
        };

        tracing::info!(
            algorithm = %spec,
            key_bits = key_size.bits(),
            "Token codec initialized"
        );

        Ok(Self {
            spec,
            key_size,
            key,
            iv,
        })
    }

    #[must_use]
    pub fn spec(&self) -> CipherSpec {
        self.spec
    }

    #[must_use]
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// Encrypt `data` into its Base64 wire form.
    ///
    /// # Errors
    /// Returns [`TokenError::EncryptionFailed`] if serialization or the cipher fails.
    pub fn encrypt_token(&self, data: &TokenData) -> Result<String, TokenError> {
        Ok(STANDARD.encode(self.seal(data)?))
    }

    /// Decrypt a token produced by this codec. Expiry is not checked.
    ///
    /// # Errors
    /// Returns [`TokenError::InvalidToken`] for malformed Base64, a bad
    /// ciphertext length, corrupted ciphertext or an unexpected payload shape.
    pub fn decrypt_token(&self, token: &str) -> Result<TokenData, TokenError> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| TokenError::invalid(format!("malformed base64: {e}")))?;
        let plaintext = Zeroizing::new(self.spec.open(self.key_size, &self.key, &self.iv, &bytes)?);
        envelope::decode(&plaintext)
    }

    /// Decrypt a token and reject it if it has expired.
    ///
    /// # Errors
    /// Everything [`TokenCodec::decrypt_token`] returns, plus
    /// [`TokenError::Expired`].
    pub fn verify(&self, token: &str) -> Result<TokenData, TokenError> {
        let data = self.decrypt_token(token)?;
        if !data.is_valid_at(Utc::now()) {
            return Err(TokenError::Expired {
                valid_before: data.valid_before,
            });
        }
        Ok(data)
    }

    /// Like [`TokenCodec::verify`], but also requires the token to have been
    /// issued as `expected`.
    ///
    /// # Errors
    /// Everything [`TokenCodec::verify`] returns. A token of another kind is
    /// [`TokenError::InvalidToken`].
    pub fn verify_kind(&self, token: &str, expected: TokenType) -> Result<TokenData, TokenError> {
        let data = self.decrypt_token(token)?;
        if data.kind != expected {
            return Err(TokenError::invalid(format!(
                "expected {expected} token, got {}",
                data.kind
            )));
        }
        if !data.is_valid_at(Utc::now()) {
            return Err(TokenError::Expired {
                valid_before: data.valid_before,
            });
        }
        Ok(data)
    }

    /// Issue a new token for `user`.
    ///
    /// # Errors
    /// Returns [`TokenError::Configuration`] if `lifetime` is out of range and
    /// [`TokenError::EncryptionFailed`] if the token cannot be encrypted.
    pub fn issue(
        &self,
        user: &str,
        kind: TokenType,
        lifetime: Duration,
    ) -> Result<Token, TokenError> {
        let metadata = TokenData::new(user, kind, lifetime)?;
        let bytes = self.seal(&metadata)?;
        tracing::debug!(%kind, user, valid_before = %metadata.valid_before, "Issued token");
        Ok(Token {
            id: Uuid::new_v4(),
            kind,
            data: STANDARD.encode(&bytes),
            bytes,
            metadata,
        })
    }

    fn seal(&self, data: &TokenData) -> Result<Vec<u8>, TokenError> {
        let mut plaintext = Zeroizing::new(envelope::encode(data)?);
        if self.spec.mode.is_block_aligned() && self.spec.padding == Padding::None {
            envelope::zero_pad(&mut plaintext, BLOCK_LEN);
        }
        self.spec.seal(self.key_size, &self.key, &self.iv, &plaintext)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_key() {
        let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        let rendered = format!("{codec:?}");
        assert!(rendered.contains("TokenCodec"));
        assert!(!rendered.contains("key:"));
    }

    #[test]
    fn cbc_retains_iv_and_ecb_has_none() {
        let ecb = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        assert!(ecb.iv.is_empty());

        let cbc = TokenCodec::new(&TokenCodecConfig {
            algorithm: "AES/CBC/PKCS5Padding".to_owned(),
            key_size: Some(192),
        })
        .unwrap();
        assert_eq!(cbc.iv.len(), BLOCK_LEN);
        assert_eq!(cbc.key.len(), 24);
    }

    #[test]
    fn issue_populates_token() {
        let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        let token = codec
            .issue("alice", TokenType::Refresh, Duration::days(7))
            .unwrap();

        assert_eq!(token.kind, TokenType::Refresh);
        assert_eq!(token.user(), "alice");
        assert!(token.is_valid());
        assert_eq!(STANDARD.decode(&token.data).unwrap(), token.bytes);
        assert_eq!(codec.decrypt_token(&token.data).unwrap(), token.metadata);
        assert_eq!(token.metadata.kind, TokenType::Refresh);
    }

    #[test]
    fn verify_kind_rejects_other_kinds() {
        let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        let refresh = codec
            .issue("alice", TokenType::Refresh, Duration::days(7))
            .unwrap();

        assert_eq!(
            codec.verify_kind(&refresh.data, TokenType::Refresh).unwrap().user,
            "alice"
        );
        for other in [TokenType::Access, TokenType::Xsrf] {
            let err = codec.verify_kind(&refresh.data, other).unwrap_err();
            assert!(matches!(err, TokenError::InvalidToken(_)));
            assert!(err.to_string().contains("refresh"));
        }
    }

    #[test]
    fn verify_kind_still_checks_expiry() {
        let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        let stale = TokenData::issued_at(
            "alice",
            TokenType::Access,
            Utc::now() - Duration::hours(2),
            Duration::hours(1),
        )
        .unwrap();
        let token = codec.encrypt_token(&stale).unwrap();

        assert!(matches!(
            codec.verify_kind(&token, TokenType::Access),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn issue_with_unrepresentable_lifetime_fails() {
        let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
        assert!(matches!(
            codec.issue("alice", TokenType::Access, Duration::MAX),
            Err(TokenError::Configuration(_))
        ));
    }
}
