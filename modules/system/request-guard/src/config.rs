use serde::{Deserialize, Serialize};
use warden_security::TokenLifetimes;

fn default_true() -> bool {
    true
}

/// Request guard configuration.
///
/// ```yaml
/// request_guard:
///   csrf:
///     enabled: true
///     trusted_base_urls: ["https://app.example.com"]
///     deny_absent_headers: true
///   public_routes:
///     - { method: GET, path: /health }
///   unrestricted_routes:
///     - { method: POST, path: /login }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RequestGuardConfig {
    /// Provenance and double-submit token validation.
    #[serde(default)]
    pub csrf: CsrfConfig,

    /// If true, routes not listed as public require authentication.
    #[serde(default = "default_true")]
    pub require_auth_by_default: bool,

    /// Routes served without authentication.
    #[serde(default)]
    pub public_routes: Vec<RouteSpec>,

    /// Routes exempt from the double-submit token check (e.g. login).
    #[serde(default)]
    pub unrestricted_routes: Vec<RouteSpec>,

    /// Lifetime of issued `X-XSRF-TOKEN` values.
    #[serde(default)]
    pub token_lifetimes: TokenLifetimes,
}

impl Default for RequestGuardConfig {
    fn default() -> Self {
        Self {
            csrf: CsrfConfig::default(),
            require_auth_by_default: true,
            public_routes: Vec::new(),
            unrestricted_routes: Vec::new(),
            token_lifetimes: TokenLifetimes::default(),
        }
    }
}

/// Settings of the provenance validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsrfConfig {
    /// Master switch for provenance and double-submit token validation.
    pub enabled: bool,

    /// Base URLs requests are expected to originate from. When empty, the
    /// targets are derived from each request (`Host`, `X-Forwarded-Host`).
    pub trusted_base_urls: Vec<String>,

    /// Reject requests that carry neither `Origin` nor `Referer`.
    pub deny_absent_headers: bool,

    /// Skip the `X-XSRF-TOKEN` check; header validation still runs.
    pub disable_token_validation: bool,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trusted_base_urls: Vec::new(),
            deny_absent_headers: true,
            disable_token_validation: false,
        }
    }
}

/// A `(method, path pattern)` pair. Patterns accept both `:param` and `{param}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
}

impl RouteSpec {
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
        }
    }
}
