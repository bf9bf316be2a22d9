//! Error types for the authentication chain.

use thiserror::Error;

/// Errors an authenticator (or the chain as a whole) can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    /// The account exists but is locked.
    #[error("account locked: {username}")]
    AccountLocked { username: String },

    /// The credentials are correct but the password has to be changed first.
    #[error("password change required: {username}")]
    MustChangePassword { username: String },

    /// The credentials do not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The presented token is unreadable or expired.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Uniform error carried by a failed chain result.
    ///
    /// Deliberately says nothing about which step failed.
    #[error("authentication failed")]
    Failed,

    /// Backend or unexpected failure inside an authenticator.
    #[error("authenticator error: {0}")]
    Other(String),
}

/// Errors reported by a [`UserManager`](crate::UserManager).
#[derive(Debug, Error)]
pub enum UserManagerError {
    #[error("user not found: {0}")]
    NotFound(String),

    /// The backing store rejects writes.
    #[error("user store is read-only")]
    ReadOnly,

    #[error("user store error: {0}")]
    Store(String),
}
