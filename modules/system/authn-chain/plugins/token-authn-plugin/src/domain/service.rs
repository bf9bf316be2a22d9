//! Service implementation for the token authentication plugin.

use std::sync::Arc;

use authn_chain_sdk::{
    AuthenticationError, AuthenticationFailureCause, AuthenticationResult, FailureCode, User,
};
use tracing::debug;
use warden_security::{Token, TokenCodec, TokenError, TokenLifetimes, TokenType};

use crate::config::TokenAuthnPluginConfig;

/// Bearer token authenticator service.
#[derive(Debug)]
pub struct Service {
    pub(crate) id: String,
    pub(crate) accept_pre_authenticated: bool,
    codec: Arc<TokenCodec>,
    lifetimes: TokenLifetimes,
}

impl Service {
    /// Create a service from plugin configuration and the process codec.
    #[must_use]
    pub fn new(cfg: &TokenAuthnPluginConfig, codec: Arc<TokenCodec>) -> Self {
        Self {
            id: cfg.id.clone(),
            accept_pre_authenticated: cfg.accept_pre_authenticated,
            codec,
            lifetimes: cfg.lifetimes.clone(),
        }
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a token of the given kind for `user`, using the configured lifetime.
    ///
    /// # Errors
    ///
    /// Propagates an out-of-bounds lifetime or the codec's encryption failure.
    pub fn issue(&self, user: &str, kind: TokenType) -> Result<Token, TokenError> {
        let lifetime = self.lifetimes.for_kind(kind)?;
        self.codec.issue(user, kind, lifetime)
    }

    /// Verify a bearer token, optionally requiring it to name `expected_user`.
    ///
    /// Only access tokens authenticate. Unreadable tokens, expired tokens,
    /// tokens of another kind and tokens naming another user come back as
    /// failed results carrying a cause.
    ///
    /// # Errors
    ///
    /// `Other` if the codec fails for a reason unrelated to the token itself.
    pub fn check_token(
        &self,
        token: &str,
        expected_user: Option<&str>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if token.is_empty() {
            return Ok(token_failure(FailureCode::InvalidToken, "empty token"));
        }

        let data = match self.codec.verify_kind(token, TokenType::Access) {
            Ok(data) => data,
            Err(TokenError::Expired { valid_before }) => {
                debug!(%valid_before, "Bearer token expired");
                return Ok(token_failure(
                    FailureCode::ExpiredToken,
                    format!("token expired at {valid_before}"),
                ));
            }
            Err(TokenError::InvalidToken(reason)) => {
                debug!(%reason, "Bearer token rejected");
                return Ok(token_failure(FailureCode::InvalidToken, reason));
            }
            Err(e @ (TokenError::Configuration(_) | TokenError::EncryptionFailed(_))) => {
                return Err(AuthenticationError::Other(e.to_string()));
            }
        };

        if let Some(expected) = expected_user
            && expected != data.user
        {
            return Ok(token_failure(
                FailureCode::InvalidToken,
                "token was issued to a different user",
            ));
        }

        Ok(AuthenticationResult::success(data.user.clone()).with_user(User::new(data.user)))
    }
}

fn token_failure(code: FailureCode, message: impl Into<String>) -> AuthenticationResult {
    AuthenticationResult::failure(AuthenticationFailureCause::new(code, message))
}
