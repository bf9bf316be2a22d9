//! Request provenance and CSRF validation.
//!
//! A request is accepted when its `Origin` (or, failing that, `Referer`)
//! points at one of the target URLs the application is served from, and,
//! for restricted endpoints, when it echoes an `X-XSRF-TOKEN` issued to the
//! principal the request authenticated as.

pub mod header_check;
pub mod middleware;
pub mod target;
pub mod validator;
pub mod xsrf;

pub use header_check::HeaderValidationInfo;
pub use middleware::{CsrfState, csrf_middleware};
pub use target::TargetUrl;
pub use validator::ProvenanceValidator;
pub use xsrf::{XSRF_TOKEN_HEADER, issue_xsrf_token};
