//! Public API trait for the authentication chain.
//!
//! This trait defines the interface that consumers use to authenticate
//! credentials and to reconfigure the chain at runtime. The orchestrator
//! implements it directly.

use async_trait::async_trait;

use crate::control::AuthenticatorControl;
use crate::models::{AuthenticationDataSource, AuthenticationResult};

/// Public API trait for the authentication chain.
///
/// Consumed by the request guard middleware:
///
/// ```ignore
/// let chain: Arc<dyn AuthnChainClient> = Arc::new(AuthnChain::new(authenticators, &cfg));
///
/// let result = chain.authenticate(&AuthenticationDataSource::bearer(token)).await;
/// if !result.authenticated {
///     // reject with 401
/// }
/// ```
///
/// # Concurrency
///
/// Reconfiguration calls may run concurrently with in-flight `authenticate`
/// calls. An in-flight evaluation always sees one complete chain, either the
/// one before or the one after the change.
#[async_trait]
pub trait AuthnChainClient: Send + Sync {
    /// Run the chain against the given credentials.
    ///
    /// Never fails: authenticator errors are folded into the returned
    /// result's failure causes.
    async fn authenticate(&self, source: &AuthenticationDataSource) -> AuthenticationResult;

    /// Effective controls in evaluation order.
    fn controls(&self) -> Vec<AuthenticatorControl>;

    /// Replace all runtime overrides with the given controls.
    fn set_controls(&self, controls: Vec<AuthenticatorControl>);

    /// Override the control of a single authenticator.
    ///
    /// Returns `false` (and changes nothing) when no authenticator with
    /// `control.name` is registered.
    fn modify_control(&self, control: AuthenticatorControl) -> bool;

    /// Ids of all registered authenticators, in discovery order.
    fn authenticator_ids(&self) -> Vec<String>;
}
