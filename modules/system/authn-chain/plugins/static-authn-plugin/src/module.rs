//! Static authentication plugin wiring.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::bail;
use tracing::info;

use crate::config::{AuthnMode, StaticAuthnPluginConfig};
use crate::domain::Service;

/// Static authentication plugin.
///
/// Validates the configuration and builds the shared [`Service`], which is
/// both the chain's [`Authenticator`](authn_chain_sdk::Authenticator) and
/// its [`UserManager`](authn_chain_sdk::UserManager).
pub struct StaticAuthnPlugin;

impl StaticAuthnPlugin {
    /// Build the plugin service from configuration.
    ///
    /// # Errors
    ///
    /// Fails on an empty authenticator id, an empty username or a username
    /// listed twice.
    pub fn init(cfg: &StaticAuthnPluginConfig) -> anyhow::Result<Arc<Service>> {
        info!("Initializing static_authn_plugin");

        if cfg.id.trim().is_empty() {
            bail!("static authn plugin id must not be empty");
        }

        let mut seen = HashSet::new();
        for entry in &cfg.users {
            if entry.username.is_empty() {
                bail!("static authn plugin user with empty username");
            }
            if !seen.insert(entry.username.as_str()) {
                bail!("static authn plugin user '{}' listed twice", entry.username);
            }
        }

        if cfg.mode == AuthnMode::AcceptAll {
            tracing::warn!(
                "Static authn plugin is running in `accept_all` mode: \
                 any non-empty username and password will be accepted. \
                 Do NOT use this mode in production."
            );
        }

        info!(
            id = %cfg.id,
            mode = ?cfg.mode,
            user_count = cfg.users.len(),
            max_failed_attempts = cfg.max_failed_attempts,
            "Loaded plugin configuration"
        );

        Ok(Arc::new(Service::from_config(cfg)))
    }
}
