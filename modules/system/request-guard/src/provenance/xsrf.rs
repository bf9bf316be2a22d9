//! Double-submit token: issuance and verification of `X-XSRF-TOKEN`.

use chrono::Duration;
use warden_security::{SecurityContext, TokenCodec, TokenData, TokenType};

use crate::error::ProvenanceError;

pub const XSRF_TOKEN_HEADER: &str = "x-xsrf-token";

/// Issue a fresh XSRF token for the principal of `ctx`.
///
/// The application hands the returned string to the client (typically in
/// the login response), which echoes it back in `X-XSRF-TOKEN`.
///
/// # Errors
/// `NoPrincipal` for an anonymous context, `TokenRejected` if the lifetime is
/// out of range or encryption fails.
pub fn issue_xsrf_token(
    codec: &TokenCodec,
    ctx: &SecurityContext,
    lifetime: Duration,
) -> Result<String, ProvenanceError> {
    let principal = ctx.principal().ok_or(ProvenanceError::NoPrincipal)?;
    let data = TokenData::new(principal, TokenType::Xsrf, lifetime)
        .map_err(ProvenanceError::TokenRejected)?;
    codec
        .encrypt_token(&data)
        .map_err(ProvenanceError::TokenRejected)
}

/// Check a presented token against the request's principal.
///
/// Only tokens issued as XSRF tokens are accepted, so a leaked bearer token
/// cannot double as one.
///
/// # Errors
/// `TokenMissing`, `NoPrincipal`, `TokenRejected` (unreadable, expired or of
/// another kind) or `PrincipalMismatch`.
pub fn verify_xsrf_token(
    codec: &TokenCodec,
    presented: Option<&str>,
    ctx: Option<&SecurityContext>,
) -> Result<(), ProvenanceError> {
    let token = presented
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ProvenanceError::TokenMissing)?;
    let principal = ctx
        .and_then(SecurityContext::principal)
        .ok_or(ProvenanceError::NoPrincipal)?;

    let data = codec
        .verify_kind(token, TokenType::Xsrf)
        .map_err(ProvenanceError::TokenRejected)?;
    if data.user != principal {
        return Err(ProvenanceError::PrincipalMismatch {
            token_user: data.user,
            principal: principal.to_owned(),
        });
    }
    Ok(())
}
