//! Authenticator implementation for the static plugin.
//!
//! Implements `Authenticator` using the domain service.

use async_trait::async_trait;
use authn_chain_sdk::{
    AuthenticationDataSource, AuthenticationError, AuthenticationResult, Authenticator,
    DataSourceKind,
};

use super::service::Service;

#[async_trait]
impl Authenticator for Service {
    fn id(&self) -> &str {
        &self.id
    }

    fn supported_sources(&self) -> &[DataSourceKind] {
        &[DataSourceKind::Password]
    }

    async fn authenticate(
        &self,
        source: &AuthenticationDataSource,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match source {
            AuthenticationDataSource::Password { username, password } => {
                self.check_password(username, password)
            }
            AuthenticationDataSource::BearerToken { .. }
            | AuthenticationDataSource::PreAuthenticated { .. } => {
                Err(AuthenticationError::Other(format!(
                    "unsupported data source {:?}",
                    source.kind()
                )))
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::StaticAuthnPluginConfig;

    #[tokio::test]
    async fn authenticator_trait_accept_all_succeeds() {
        let service = Service::from_config(&StaticAuthnPluginConfig::default());
        let plugin: &dyn Authenticator = &service;

        let result = plugin
            .authenticate(&AuthenticationDataSource::password("alice", "pw"))
            .await;
        assert!(result.unwrap().authenticated);
    }

    #[tokio::test]
    async fn authenticator_trait_declares_password_only() {
        let service = Service::from_config(&StaticAuthnPluginConfig::default());
        let plugin: &dyn Authenticator = &service;

        assert_eq!(plugin.id(), "static");
        assert!(plugin.supports_data_source(&AuthenticationDataSource::password("a", "b")));
        assert!(!plugin.supports_data_source(&AuthenticationDataSource::bearer("t")));

        let result = plugin
            .authenticate(&AuthenticationDataSource::bearer("t"))
            .await;
        match result.unwrap_err() {
            AuthenticationError::Other(_) => {}
            other => panic!("Expected Other, got: {other:?}"),
        }
    }
}
