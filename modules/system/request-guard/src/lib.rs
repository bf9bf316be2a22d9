//! HTTP request guard.
//!
//! Two axum middlewares applied by [`RequestGuard::apply`]:
//!
//! - [`auth::authn_middleware`] turns the `Authorization` header into
//!   credentials, runs the authentication chain and stores the resulting
//!   [`SecurityContext`](warden_security::SecurityContext) in the request
//!   extensions. Failures are 401 with a `WWW-Authenticate: Bearer` challenge.
//! - [`provenance::csrf_middleware`] checks `Origin` / `Referer` against the
//!   trusted targets and, on restricted endpoints, the `X-XSRF-TOKEN`
//!   double-submit token. Failures are a bare 403.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod problem;
pub mod provenance;

pub use config::{CsrfConfig, RequestGuardConfig, RouteSpec};
pub use error::{GuardError, ProvenanceError};
pub use guard::RequestGuard;
pub use problem::{BearerChallenge, PROBLEM_CONTENT_TYPE, Problem};
pub use provenance::{HeaderValidationInfo, ProvenanceValidator, XSRF_TOKEN_HEADER};
