//! Token authentication plugin wiring.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;
use warden_security::TokenCodec;

use crate::config::TokenAuthnPluginConfig;
use crate::domain::Service;

/// Token authentication plugin.
///
/// Shares the process [`TokenCodec`] with the request guard, so tokens it
/// accepts are exactly the ones issued in this process.
pub struct TokenAuthnPlugin;

impl TokenAuthnPlugin {
    /// Build the plugin service.
    ///
    /// # Errors
    ///
    /// Fails on an empty authenticator id or an out-of-bounds token lifetime.
    pub fn init(cfg: &TokenAuthnPluginConfig, codec: Arc<TokenCodec>) -> anyhow::Result<Arc<Service>> {
        info!("Initializing token_authn_plugin");

        if cfg.id.trim().is_empty() {
            bail!("token authn plugin id must not be empty");
        }
        cfg.lifetimes
            .validate()
            .context("invalid token authn plugin lifetimes")?;

        info!(
            id = %cfg.id,
            algorithm = %codec.spec(),
            accept_pre_authenticated = cfg.accept_pre_authenticated,
            access_secs = cfg.lifetimes.access_secs,
            refresh_secs = cfg.lifetimes.refresh_secs,
            "Loaded plugin configuration"
        );

        Ok(Arc::new(Service::new(cfg, codec)))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use warden_security::TokenCodecConfig;

    use super::*;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&TokenCodecConfig::default()).unwrap())
    }

    #[test]
    fn rejects_non_positive_lifetimes() {
        let mut cfg = TokenAuthnPluginConfig::default();
        cfg.lifetimes.access_secs = 0;
        assert!(TokenAuthnPlugin::init(&cfg, codec()).is_err());
    }

    #[test]
    fn rejects_unrepresentable_lifetimes() {
        for secs in [i64::MAX, i64::MIN] {
            let mut cfg = TokenAuthnPluginConfig::default();
            cfg.lifetimes.refresh_secs = secs;
            let err = TokenAuthnPlugin::init(&cfg, codec()).unwrap_err();
            assert!(format!("{err:#}").contains("refresh_secs"), "{secs}");
        }
    }

    #[test]
    fn config_from_json() {
        let cfg: TokenAuthnPluginConfig = serde_json::from_value(serde_json::json!({
            "id": "bearer",
            "lifetimes": { "access_secs": 60 }
        }))
        .unwrap();

        assert_eq!(cfg.id, "bearer");
        assert!(cfg.accept_pre_authenticated);
        assert_eq!(cfg.lifetimes.access_secs, 60);
        assert_eq!(cfg.lifetimes.refresh_secs, 7 * 24 * 60 * 60);

        let service = TokenAuthnPlugin::init(&cfg, codec()).unwrap();
        assert_eq!(authn_chain_sdk::Authenticator::id(service.as_ref()), "bearer");
    }
}
