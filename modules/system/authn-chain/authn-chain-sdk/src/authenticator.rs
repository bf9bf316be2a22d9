//! Capability trait for authenticator implementations.
//!
//! Each credential type (password, bearer token, pre-authenticated token)
//! is handled by one or more authenticators. The chain never inspects the
//! concrete type; it only asks the questions defined here.

use async_trait::async_trait;

use crate::error::AuthenticationError;
use crate::models::{AuthenticationDataSource, AuthenticationResult, DataSourceKind};

/// A single step of the authentication chain.
///
/// Implementations must be safe for concurrent use: the chain calls
/// `authenticate` from many requests at once without any locking.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Stable identifier, used to attach an [`AuthenticatorControl`](crate::AuthenticatorControl).
    fn id(&self) -> &str;

    /// Whether the authenticator is currently usable (configured, backend reachable).
    fn is_valid(&self) -> bool {
        true
    }

    /// Data source kinds this authenticator accepts.
    fn supported_sources(&self) -> &[DataSourceKind];

    /// Whether this authenticator can handle the given credentials.
    fn supports_data_source(&self, source: &AuthenticationDataSource) -> bool {
        self.supported_sources().contains(&source.kind())
    }

    /// Verify the credentials.
    ///
    /// A rejected credential may be reported either as a result with
    /// `authenticated == false` carrying failure causes, or as an error.
    ///
    /// # Errors
    ///
    /// - `AccountLocked` / `MustChangePassword` for account-state conditions
    /// - `InvalidCredentials` when the credentials do not match
    /// - `Other` for backend failures
    async fn authenticate(
        &self,
        source: &AuthenticationDataSource,
    ) -> Result<AuthenticationResult, AuthenticationError>;
}
