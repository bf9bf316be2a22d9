//! Configuration for the token authentication plugin.

use serde::Deserialize;
use warden_security::TokenLifetimes;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenAuthnPluginConfig {
    /// Authenticator id used to attach a chain control.
    pub id: String,

    /// Also accept pre-authenticated identities whose token names the same user.
    pub accept_pre_authenticated: bool,

    /// Lifetimes of the tokens this plugin issues.
    pub lifetimes: TokenLifetimes,
}

impl Default for TokenAuthnPluginConfig {
    fn default() -> Self {
        Self {
            id: "token".to_owned(),
            accept_pre_authenticated: true,
            lifetimes: TokenLifetimes::default(),
        }
    }
}
