use std::sync::Arc;

use anyhow::Context;
use authn_chain_sdk::AuthnChainClient;
use axum::Router;
use axum::middleware::from_fn_with_state;
use tracing::info;
use warden_security::{SecurityContext, TokenCodec};

use crate::auth::{AuthState, authn_middleware, build_route_policy};
use crate::config::RequestGuardConfig;
use crate::error::ProvenanceError;
use crate::provenance::{CsrfState, ProvenanceValidator, csrf_middleware, issue_xsrf_token};

/// Authentication and provenance middleware stack for an axum router.
///
/// ```ignore
/// let guard = RequestGuard::new(&cfg, chain, codec)?;
/// let app = guard.apply(Router::new().route("/items", post(create_item)));
/// ```
#[derive(Clone)]
pub struct RequestGuard {
    auth: AuthState,
    csrf: CsrfState,
    csrf_enabled: bool,
    xsrf_lifetime: chrono::Duration,
}

impl RequestGuard {
    /// # Errors
    /// Fails on invalid route patterns, trusted base URLs or an out-of-bounds
    /// XSRF token lifetime.
    pub fn new(
        cfg: &RequestGuardConfig,
        chain: Arc<dyn AuthnChainClient>,
        codec: Arc<TokenCodec>,
    ) -> anyhow::Result<Self> {
        let route_policy = build_route_policy(cfg)?;
        let xsrf_lifetime = cfg
            .token_lifetimes
            .xsrf()
            .context("invalid request guard token lifetime")?;
        let validator =
            ProvenanceValidator::new(cfg, codec).context("invalid request guard configuration")?;

        info!(
            csrf_enabled = cfg.csrf.enabled,
            deny_absent_headers = cfg.csrf.deny_absent_headers,
            disable_token_validation = cfg.csrf.disable_token_validation,
            trusted_base_urls = cfg.csrf.trusted_base_urls.len(),
            xsrf_secs = xsrf_lifetime.num_seconds(),
            public_routes = cfg.public_routes.len(),
            unrestricted_routes = cfg.unrestricted_routes.len(),
            "Request guard initialized"
        );
        if !cfg.csrf.enabled {
            tracing::warn!("CSRF protection is disabled");
        }

        Ok(Self {
            auth: AuthState {
                chain,
                route_policy: route_policy.clone(),
            },
            csrf: CsrfState {
                validator: Arc::new(validator),
                route_policy,
            },
            csrf_enabled: cfg.csrf.enabled,
            xsrf_lifetime,
        })
    }

    /// Wrap `router` so authentication runs first, then provenance validation.
    #[must_use]
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // The last layer added runs first.
        let router = if self.csrf_enabled {
            router.layer(from_fn_with_state(self.csrf.clone(), csrf_middleware))
        } else {
            router
        };
        router.layer(from_fn_with_state(self.auth.clone(), authn_middleware))
    }

    /// Issue an `X-XSRF-TOKEN` value for the request's principal.
    ///
    /// # Errors
    /// See [`issue_xsrf_token`].
    pub fn issue_xsrf_token(&self, ctx: &SecurityContext) -> Result<String, ProvenanceError> {
        issue_xsrf_token(self.csrf.validator.codec(), ctx, self.xsrf_lifetime)
    }

    #[must_use]
    pub fn validator(&self) -> &ProvenanceValidator {
        &self.csrf.validator
    }
}
