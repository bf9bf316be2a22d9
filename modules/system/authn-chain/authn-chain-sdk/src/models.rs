//! Domain models for the authentication chain.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AuthenticationError;

/// Discriminant of [`AuthenticationDataSource`], used by authenticators to
/// declare which credentials they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Password,
    BearerToken,
    PreAuthenticated,
}

/// Credentials extracted from a request, carried unmodified through the chain.
#[derive(Debug, Clone)]
pub enum AuthenticationDataSource {
    /// Username and password (e.g. HTTP Basic).
    Password {
        username: String,
        password: SecretString,
    },
    /// Opaque bearer token from the `Authorization` header.
    BearerToken { token: SecretString },
    /// Identity already asserted by a trusted upstream, plus its token.
    PreAuthenticated {
        username: String,
        token: SecretString,
    },
}

impl AuthenticationDataSource {
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::BearerToken {
            token: SecretString::from(token.into()),
        }
    }

    #[must_use]
    pub fn pre_authenticated(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self::PreAuthenticated {
            username: username.into(),
            token: SecretString::from(token.into()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DataSourceKind {
        match self {
            Self::Password { .. } => DataSourceKind::Password,
            Self::BearerToken { .. } => DataSourceKind::BearerToken,
            Self::PreAuthenticated { .. } => DataSourceKind::PreAuthenticated,
        }
    }

    /// Username claimed by the credentials, if the variant carries one.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Password { username, .. } | Self::PreAuthenticated { username, .. } => {
                Some(username)
            }
            Self::BearerToken { .. } => None,
        }
    }

    /// Token value for the token-carrying variants.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::BearerToken { token } | Self::PreAuthenticated { token, .. } => {
                Some(token.expose_secret())
            }
            Self::Password { .. } => None,
        }
    }
}

/// Reference to an account held by the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub failed_login_attempts: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub password_change_required: bool,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            failed_login_attempts: 0,
            locked: false,
            password_change_required: false,
        }
    }
}

/// Why a chain step rejected the credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NoSuchUser,
    InvalidCredentials,
    LockedUser,
    MustChangePassword,
    InvalidToken,
    ExpiredToken,
    NoAuthenticator,
    AuthenticatorError,
}

impl FailureCode {
    /// OAuth 2.0 bearer `error` code reported in the `WWW-Authenticate` challenge.
    #[must_use]
    pub fn bearer_error(self) -> &'static str {
        match self {
            Self::InvalidToken | Self::ExpiredToken => "invalid_token",
            Self::NoSuchUser | Self::InvalidCredentials | Self::NoAuthenticator => {
                "invalid_request"
            }
            Self::LockedUser => "account_locked",
            Self::MustChangePassword => "password_expired",
            Self::AuthenticatorError => "server_error",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoSuchUser => "no_such_user",
            Self::InvalidCredentials => "invalid_credentials",
            Self::LockedUser => "locked_user",
            Self::MustChangePassword => "must_change_password",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::NoAuthenticator => "no_authenticator",
            Self::AuthenticatorError => "authenticator_error",
        };
        f.write_str(s)
    }
}

/// One entry of the failure list accumulated while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailureCause {
    pub code: FailureCode,
    pub message: String,
    /// Account the failure refers to, when known.
    pub user: Option<User>,
}

impl AuthenticationFailureCause {
    #[must_use]
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            user: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

impl From<&AuthenticationError> for AuthenticationFailureCause {
    fn from(err: &AuthenticationError) -> Self {
        let code = match err {
            AuthenticationError::AccountLocked { .. } => FailureCode::LockedUser,
            AuthenticationError::MustChangePassword { .. } => FailureCode::MustChangePassword,
            AuthenticationError::InvalidCredentials | AuthenticationError::Failed => {
                FailureCode::InvalidCredentials
            }
            AuthenticationError::InvalidToken(_) => FailureCode::InvalidToken,
            AuthenticationError::Other(_) => FailureCode::AuthenticatorError,
        };
        Self::new(code, err.to_string())
    }
}

/// Outcome of one authenticator, or of the whole chain.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationResult {
    pub authenticated: bool,
    /// Account of the authenticated principal, when the authenticator knows it.
    pub user: Option<User>,
    /// Authenticated username.
    pub principal: Option<String>,
    /// Id of the authenticator that produced this result.
    pub authenticator_id: Option<String>,
    pub exception: Option<AuthenticationError>,
    pub failure_causes: Vec<AuthenticationFailureCause>,
}

impl AuthenticationResult {
    #[must_use]
    pub fn success(principal: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            principal: Some(principal.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(cause: AuthenticationFailureCause) -> Self {
        Self {
            authenticated: false,
            failure_causes: vec![cause],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_authenticator(mut self, id: impl Into<String>) -> Self {
        self.authenticator_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_exception(mut self, err: AuthenticationError) -> Self {
        self.exception = Some(err);
        self
    }

    /// First failure cause, if any.
    #[must_use]
    pub fn primary_cause(&self) -> Option<&AuthenticationFailureCause> {
        self.failure_causes.first()
    }
}
