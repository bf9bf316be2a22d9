//! Provenance / CSRF middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_security::SecurityContext;

use super::validator::ProvenanceValidator;
use crate::auth::{GuardRoutePolicy, is_preflight_request};
use crate::problem::Problem;

/// Shared state for [`csrf_middleware`].
#[derive(Clone)]
pub struct CsrfState {
    pub validator: Arc<ProvenanceValidator>,
    pub route_policy: GuardRoutePolicy,
}

/// Validate request provenance before the handler runs.
///
/// Runs after authentication so the resolved [`SecurityContext`] is
/// available. Every rejection is the same bare 403; the reason is logged.
pub async fn csrf_middleware(
    State(state): State<CsrfState>,
    req: Request,
    next: Next,
) -> Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let restricted = state
        .route_policy
        .is_restricted(req.method(), req.uri().path());
    let ctx = req.extensions().get::<SecurityContext>();

    if let Err(err) = state
        .validator
        .validate(req.uri(), req.headers(), ctx, restricted)
    {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            principal = ctx.and_then(SecurityContext::principal).unwrap_or("-"),
            error = %err,
            "Request rejected by provenance validation"
        );
        return Problem::forbidden().into_response();
    }

    next.run(req).await
}
