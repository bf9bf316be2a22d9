//! Client implementation for the authentication chain.
//!
//! Implements `AuthnChainClient` using the orchestrator.

use async_trait::async_trait;
use authn_chain_sdk::{
    AuthenticationDataSource, AuthenticationResult, AuthenticatorControl, AuthnChainClient,
};

use super::service::AuthnChain;

#[async_trait]
impl AuthnChainClient for AuthnChain {
    async fn authenticate(&self, source: &AuthenticationDataSource) -> AuthenticationResult {
        AuthnChain::authenticate(self, source).await
    }

    fn controls(&self) -> Vec<AuthenticatorControl> {
        AuthnChain::controls(self)
    }

    fn set_controls(&self, controls: Vec<AuthenticatorControl>) {
        AuthnChain::set_controls(self, controls);
    }

    fn modify_control(&self, control: AuthenticatorControl) -> bool {
        AuthnChain::modify_control(self, control)
    }

    fn authenticator_ids(&self) -> Vec<String> {
        AuthnChain::authenticator_ids(self)
    }
}
