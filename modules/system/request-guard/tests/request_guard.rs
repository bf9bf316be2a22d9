#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The full guard in front of a router: chain with password and token
//! authenticators, provenance checks and the double-submit token.

use std::sync::Arc;

use authn_chain::{AuthnChain, AuthnChainConfig};
use authn_chain_sdk::{AuthnChainClient, Authenticator, UserManager};
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use request_guard::{
    CsrfConfig, PROBLEM_CONTENT_TYPE, Problem, RequestGuard, RequestGuardConfig, RouteSpec,
};
use static_authn_plugin::StaticAuthnPlugin;
use static_authn_plugin::config::{AuthnMode, StaticAuthnPluginConfig, UserEntry};
use token_authn_plugin::TokenAuthnPlugin;
use token_authn_plugin::config::TokenAuthnPluginConfig;
use tower::ServiceExt;
use warden_security::{SecurityContext, TokenCodec, TokenCodecConfig, TokenData, TokenType};

const APP: &str = "https://app.example.com";

struct Harness {
    app: Router,
    guard: RequestGuard,
    codec: Arc<TokenCodec>,
    tokens: Arc<token_authn_plugin::Service>,
}

fn base_config() -> RequestGuardConfig {
    RequestGuardConfig {
        csrf: CsrfConfig {
            trusted_base_urls: vec![APP.to_owned()],
            ..CsrfConfig::default()
        },
        public_routes: vec![RouteSpec::new("GET", "/health")],
        unrestricted_routes: vec![RouteSpec::new("POST", "/login")],
        ..RequestGuardConfig::default()
    }
}

fn harness(cfg: &RequestGuardConfig) -> Harness {
    let codec = Arc::new(TokenCodec::new(&TokenCodecConfig::default()).unwrap());

    let passwords = StaticAuthnPlugin::init(&StaticAuthnPluginConfig {
        mode: AuthnMode::StaticUsers,
        users: vec![
            UserEntry::new("alice", "wonderland"),
            UserEntry::new("bob", "builder"),
        ],
        ..StaticAuthnPluginConfig::default()
    })
    .unwrap();
    let tokens = TokenAuthnPlugin::init(&TokenAuthnPluginConfig::default(), codec.clone()).unwrap();

    let password_authn: Arc<dyn Authenticator> = passwords.clone();
    let token_authn: Arc<dyn Authenticator> = tokens.clone();
    let users: Arc<dyn UserManager> = passwords;
    let chain: Arc<dyn AuthnChainClient> = Arc::new(
        AuthnChain::new(vec![password_authn, token_authn], &AuthnChainConfig::default())
            .with_user_manager(users),
    );

    let guard = RequestGuard::new(cfg, chain, codec.clone()).unwrap();

    let login_guard = guard.clone();
    let routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/login",
            post(move |Extension(ctx): Extension<SecurityContext>| async move {
                let xsrf = login_guard.issue_xsrf_token(&ctx).unwrap();
                Json(serde_json::json!({ "user": ctx.principal(), "xsrf": xsrf }))
            }),
        )
        .route(
            "/items/{id}",
            post(|Extension(ctx): Extension<SecurityContext>| async move {
                ctx.principal().unwrap_or_default().to_owned()
            }),
        );

    Harness {
        app: guard.apply(routes),
        guard,
        codec,
        tokens,
    }
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn login(h: &Harness, user: &str, password: &str) -> String {
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic(user, password).as_str()),
                ("origin", APP),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["user"], user);
    body["xsrf"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn origin_with_explicit_default_port_is_accepted() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("origin", "https://app.example.com:443"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn origin_port_mismatch_without_referer_is_forbidden() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("origin", "https://app.example.com:8443"),
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_CONTENT_TYPE);
    let problem: Problem = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(problem, Problem::forbidden());
}

#[tokio::test]
async fn absent_headers_accepted_when_configured() {
    let mut cfg = base_config();
    cfg.csrf.deny_absent_headers = false;
    let h = harness(&cfg);
    let xsrf = login(&h, "alice", "wonderland").await;

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/1",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("x-xsrf-token", xsrf.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn absent_headers_rejected_by_default() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[("authorization", basic("alice", "wonderland").as_str())],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn forwarded_hosts_are_candidate_targets() {
    let mut cfg = base_config();
    cfg.csrf.trusted_base_urls.clear();
    let h = harness(&cfg);
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("host", "10.0.0.7:8080"),
                ("x-forwarded-host", "a.example.com, b.example.com"),
                ("x-forwarded-proto", "https"),
                ("origin", "https://b.example.com"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("host", "10.0.0.7:8080"),
                ("x-forwarded-host", "a.example.com, b.example.com"),
                ("x-forwarded-proto", "https"),
                ("origin", "https://c.example.com"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn xsrf_token_of_another_user_is_forbidden() {
    let h = harness(&base_config());
    let alice_xsrf = login(&h, "alice", "wonderland").await;

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", basic("bob", "builder").as_str()),
                ("origin", APP),
                ("x-xsrf-token", alice_xsrf.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn restricted_endpoint_requires_xsrf_token() {
    let h = harness(&base_config());
    let xsrf = login(&h, "alice", "wonderland").await;

    let missing = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[("authorization", basic("alice", "wonderland").as_str()), ("origin", APP)],
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let ok = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("referer", "https://app.example.com/items"),
                ("x-xsrf-token", xsrf.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_xsrf_token_is_forbidden() {
    let h = harness(&base_config());
    let stale = TokenData::issued_at(
        "alice",
        TokenType::Xsrf,
        Utc::now() - Duration::hours(9),
        Duration::hours(8),
    )
    .unwrap();
    let stale = h.codec.encrypt_token(&stale).unwrap();

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("origin", APP),
                ("x-xsrf-token", stale.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_validation_can_be_disabled() {
    let mut cfg = base_config();
    cfg.csrf.disable_token_validation = true;
    let h = harness(&cfg);
    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[("authorization", basic("alice", "wonderland").as_str()), ("origin", APP)],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn csrf_disabled_bypasses_validation() {
    let mut cfg = base_config();
    cfg.csrf.enabled = false;
    let h = harness(&cfg);
    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", basic("alice", "wonderland").as_str()),
                ("origin", "https://evil.example.com"),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_credentials_get_bearer_challenge() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[("host", "app.example.com"), ("origin", APP)],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        r#"Bearer realm="app.example.com", error="invalid_request", error_description="Missing credentials""#
    );
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "POST",
            "/login",
            &[
                ("authorization", basic("alice", "nope").as_str()),
                ("host", "app.example.com"),
                ("origin", APP),
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        r#"Bearer realm="app.example.com", error="invalid_request", error_description="Authentication failed""#
    );
}

#[tokio::test]
async fn bearer_access_token_authenticates() {
    let h = harness(&base_config());
    let access = h.tokens.issue("alice", TokenType::Access).unwrap();
    let alice = SecurityContext::builder().principal("alice").build();
    let xsrf = h.guard.issue_xsrf_token(&alice).unwrap();

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", format!("Bearer {}", access.data).as_str()),
                ("origin", APP),
                ("x-xsrf-token", xsrf.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn expired_bearer_token_reports_invalid_token() {
    let h = harness(&base_config());
    let stale = TokenData::issued_at(
        "alice",
        TokenType::Access,
        Utc::now() - Duration::days(1),
        Duration::hours(3),
    )
    .unwrap();
    let stale = h.codec.encrypt_token(&stale).unwrap();

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", format!("Bearer {stale}").as_str()),
                ("origin", APP),
            ],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
    assert!(challenge.contains(r#"error="invalid_token""#), "{challenge}");
}

#[tokio::test]
async fn public_route_needs_no_credentials() {
    let h = harness(&base_config());
    let response = send(&h.app, request("GET", "/health", &[("origin", APP)])).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn preflight_skips_the_guard() {
    let h = harness(&base_config());
    let response = send(
        &h.app,
        request(
            "OPTIONS",
            "/items/7",
            &[
                ("origin", "https://evil.example.com"),
                ("access-control-request-method", "POST"),
            ],
        ),
    )
    .await;
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bearer_token_is_not_an_xsrf_token() {
    let h = harness(&base_config());
    let access = h.tokens.issue("alice", TokenType::Access).unwrap();

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", format!("Bearer {}", access.data).as_str()),
                ("origin", APP),
                ("x-xsrf-token", access.data.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn xsrf_token_is_not_a_bearer_token() {
    let h = harness(&base_config());
    let alice = SecurityContext::builder().principal("alice").build();
    let xsrf = h.guard.issue_xsrf_token(&alice).unwrap();

    let response = send(
        &h.app,
        request(
            "POST",
            "/items/7",
            &[
                ("authorization", format!("Bearer {xsrf}").as_str()),
                ("origin", APP),
                ("x-xsrf-token", xsrf.as_str()),
            ],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn out_of_bounds_xsrf_lifetime_fails_construction() {
    for secs in [0, -5, i64::MAX] {
        let mut cfg = base_config();
        cfg.token_lifetimes.xsrf_secs = secs;

        let codec = Arc::new(TokenCodec::new(&TokenCodecConfig::default()).unwrap());
        let chain: Arc<dyn AuthnChainClient> =
            Arc::new(AuthnChain::new(Vec::new(), &AuthnChainConfig::default()));
        let err = RequestGuard::new(&cfg, chain, codec).err().unwrap();
        assert!(format!("{err:#}").contains("xsrf_secs"), "{secs}");
    }
}
