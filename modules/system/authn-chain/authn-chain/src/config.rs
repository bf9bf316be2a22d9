//! Configuration for the authentication chain.

use authn_chain_sdk::AuthenticatorControl;
use serde::Deserialize;

/// Configuration.
///
/// ```yaml
/// authn_chain:
///   controls:
///     - name: "token"
///       priority: 200
///       kind: SUFFICIENT
///     - name: "password"
///       kind: REQUISITE
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthnChainConfig {
    /// Default controls, keyed by authenticator id.
    ///
    /// Authenticators without an entry run as `{priority: 100, kind: SUFFICIENT, active: true}`.
    pub controls: Vec<AuthenticatorControl>,
}
