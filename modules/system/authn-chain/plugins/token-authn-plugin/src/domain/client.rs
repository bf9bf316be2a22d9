//! Authenticator implementation for the token plugin.

use async_trait::async_trait;
use authn_chain_sdk::{
    AuthenticationDataSource, AuthenticationError, AuthenticationResult, Authenticator,
    DataSourceKind,
};
use secrecy::ExposeSecret;

use super::service::Service;

const BEARER_ONLY: &[DataSourceKind] = &[DataSourceKind::BearerToken];
const BEARER_AND_PRE_AUTHENTICATED: &[DataSourceKind] =
    &[DataSourceKind::BearerToken, DataSourceKind::PreAuthenticated];

#[async_trait]
impl Authenticator for Service {
    fn id(&self) -> &str {
        &self.id
    }

    fn supported_sources(&self) -> &[DataSourceKind] {
        if self.accept_pre_authenticated {
            BEARER_AND_PRE_AUTHENTICATED
        } else {
            BEARER_ONLY
        }
    }

    async fn authenticate(
        &self,
        source: &AuthenticationDataSource,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match source {
            AuthenticationDataSource::BearerToken { token } => {
                self.check_token(token.expose_secret(), None)
            }
            AuthenticationDataSource::PreAuthenticated { username, token }
                if self.accept_pre_authenticated =>
            {
                self.check_token(token.expose_secret(), Some(username.as_str()))
            }
            AuthenticationDataSource::PreAuthenticated { .. }
            | AuthenticationDataSource::Password { .. } => Err(AuthenticationError::Other(
                format!("unsupported data source {:?}", source.kind()),
            )),
        }
    }
}
