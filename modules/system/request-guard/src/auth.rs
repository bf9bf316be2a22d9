use std::collections::HashMap;
use std::sync::Arc;

use authn_chain_sdk::{AuthenticationDataSource, AuthnChainClient};
use axum::http::{HeaderMap, Method, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use warden_security::SecurityContext;

use crate::config::{RequestGuardConfig, RouteSpec};
use crate::error::GuardError;
use crate::problem::BearerChallenge;

const DEFAULT_REALM: &str = "warden";

/// Route matcher for a specific HTTP method.
#[derive(Clone)]
pub struct RouteMatcher {
    matcher: matchit::Router<()>,
}

impl RouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    fn insert(&mut self, path: &str) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, ())
    }

    fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Convert Axum path syntax `:param` to matchit syntax `{param}`
fn convert_axum_path_to_matchit(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' {
            result.push('{');
            while matches!(chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                if let Some(c) = chars.next() {
                    result.push(c);
                }
            }
            result.push('}');
        } else {
            result.push(ch);
        }
    }

    result
}

/// Whether a route requires authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No authentication required (public route).
    None,
    /// Authentication required.
    Required,
}

type MatcherMap = Arc<HashMap<Method, RouteMatcher>>;

/// Per-route authentication and double-submit policy.
#[derive(Clone)]
pub struct GuardRoutePolicy {
    public_matchers: MatcherMap,
    unrestricted_matchers: MatcherMap,
    require_auth_by_default: bool,
}

impl GuardRoutePolicy {
    #[must_use]
    pub fn new(
        public_matchers: MatcherMap,
        unrestricted_matchers: MatcherMap,
        require_auth_by_default: bool,
    ) -> Self {
        Self {
            public_matchers,
            unrestricted_matchers,
            require_auth_by_default,
        }
    }

    /// Resolve the authentication requirement for a given (method, path).
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> AuthRequirement {
        let is_public = matches(&self.public_matchers, method, path);

        if self.require_auth_by_default && !is_public {
            AuthRequirement::Required
        } else {
            AuthRequirement::None
        }
    }

    /// Restricted endpoints require authentication and are not listed as
    /// unrestricted; only they are subject to the double-submit token check.
    #[must_use]
    pub fn is_restricted(&self, method: &Method, path: &str) -> bool {
        self.resolve(method, path) == AuthRequirement::Required
            && !matches(&self.unrestricted_matchers, method, path)
    }
}

fn matches(map: &HashMap<Method, RouteMatcher>, method: &Method, path: &str) -> bool {
    map.get(method).is_some_and(|matcher| matcher.find(path))
}

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub chain: Arc<dyn AuthnChainClient>,
    pub route_policy: GuardRoutePolicy,
}

/// Build [`GuardRoutePolicy`] from the configured route lists.
///
/// # Errors
/// Fails on an unknown HTTP method or a path pattern matchit rejects.
pub fn build_route_policy(cfg: &RequestGuardConfig) -> Result<GuardRoutePolicy, anyhow::Error> {
    Ok(GuardRoutePolicy::new(
        Arc::new(build_matchers(&cfg.public_routes, "public")?),
        Arc::new(build_matchers(&cfg.unrestricted_routes, "unrestricted")?),
        cfg.require_auth_by_default,
    ))
}

fn build_matchers(
    routes: &[RouteSpec],
    kind: &str,
) -> Result<HashMap<Method, RouteMatcher>, anyhow::Error> {
    let mut matchers: HashMap<Method, RouteMatcher> = HashMap::new();

    for route in routes {
        let method = Method::from_bytes(route.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid method '{}' in {kind} route: {e}", route.method))?;
        let matchit_path = convert_axum_path_to_matchit(&route.path);
        matchers
            .entry(method)
            .or_insert_with(RouteMatcher::new)
            .insert(&matchit_path)
            .map_err(|e| {
                anyhow::anyhow!("Failed to insert {kind} route pattern '{}': {e}", route.path)
            })?;
    }

    Ok(matchers)
}

/// Authentication middleware that runs the authentication chain.
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Resolves the route's auth requirement via `GuardRoutePolicy`
/// 3. For public routes: inserts anonymous `SecurityContext`
/// 4. For required routes: extracts credentials, runs the chain, inserts `SecurityContext`
pub async fn authn_middleware(
    axum::extract::State(state): axum::extract::State<AuthState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let requirement = state.route_policy.resolve(req.method(), req.uri().path());
    if requirement == AuthRequirement::None {
        req.extensions_mut().insert(SecurityContext::anonymous());
        return next.run(req).await;
    }

    let realm = realm(req.headers());
    let source = match extract_credentials(req.headers()) {
        Ok(source) => source,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected request credentials");
            let description = match err {
                GuardError::MissingCredentials => "Missing credentials",
                GuardError::UnsupportedScheme(_) | GuardError::MalformedCredentials(_) => {
                    "Invalid Authorization header"
                }
            };
            return BearerChallenge::new(&realm, "invalid_request", description)
                .into_unauthorized();
        }
    };

    let result = state.chain.authenticate(&source).await;
    let Some(principal) = result
        .principal
        .as_deref()
        .filter(|_| result.authenticated)
    else {
        let error = result
            .primary_cause()
            .map_or("invalid_request", |cause| cause.code.bearer_error());
        tracing::debug!(
            error,
            causes = result.failure_causes.len(),
            "Authentication chain rejected credentials"
        );
        return BearerChallenge::new(&realm, error, "Authentication failed").into_unauthorized();
    };

    let mut ctx = SecurityContext::builder().principal(principal);
    if let Some(id) = result.authenticator_id.as_deref() {
        ctx = ctx.authenticator_id(id);
    }
    if let AuthenticationDataSource::BearerToken { token } = source {
        ctx = ctx.bearer_token(token);
    }
    req.extensions_mut().insert(ctx.build());
    next.run(req).await
}

/// Turn the `Authorization` header into chain credentials.
///
/// `Basic` yields a password source, `Bearer` a bearer token source. The
/// scheme name is case-insensitive.
///
/// # Errors
/// `MissingCredentials`, `UnsupportedScheme` or `MalformedCredentials`.
pub fn extract_credentials(headers: &HeaderMap) -> Result<AuthenticationDataSource, GuardError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GuardError::MissingCredentials)?
        .to_str()
        .map_err(|_| GuardError::MalformedCredentials("non-ASCII header value"))?
        .trim();

    let (scheme, params) = value.split_once(' ').unwrap_or((value, ""));
    let params = params.trim();

    if scheme.eq_ignore_ascii_case("basic") {
        let decoded = STANDARD
            .decode(params)
            .map_err(|_| GuardError::MalformedCredentials("invalid base64"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| GuardError::MalformedCredentials("credentials are not UTF-8"))?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(GuardError::MalformedCredentials("missing ':' separator"))?;
        Ok(AuthenticationDataSource::password(username, password))
    } else if scheme.eq_ignore_ascii_case("bearer") {
        if params.is_empty() {
            return Err(GuardError::MalformedCredentials("empty bearer token"));
        }
        Ok(AuthenticationDataSource::bearer(params))
    } else {
        Err(GuardError::UnsupportedScheme(scheme.to_owned()))
    }
}

fn realm(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_REALM)
        .to_owned()
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
pub(crate) fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
