//! Configuration for the static authentication plugin.

use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthnPluginConfig {
    /// Authenticator id used to attach a chain control.
    pub id: String,

    /// Authentication mode.
    pub mode: AuthnMode,

    /// Static user table for `static_users` mode.
    pub users: Vec<UserEntry>,

    /// Consecutive failed logins after which an account is locked. `0` disables locking.
    pub max_failed_attempts: u32,
}

impl Default for StaticAuthnPluginConfig {
    fn default() -> Self {
        Self {
            id: "static".to_owned(),
            mode: AuthnMode::AcceptAll,
            users: Vec::new(),
            max_failed_attempts: 5,
        }
    }
}

/// Authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthnMode {
    /// Accept any non-empty username and password pair.
    #[default]
    AcceptAll,
    /// Only accept the configured users with their configured passwords.
    StaticUsers,
}

/// One account of the static user table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub password_change_required: bool,
}

impl UserEntry {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: SecretString::from(password),
            locked: false,
            password_change_required: false,
        }
    }
}
