use thiserror::Error;
use warden_security::TokenError;

/// Why the `Authorization` header could not be turned into credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("missing Authorization header")]
    MissingCredentials,

    #[error("unsupported authorization scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("malformed credentials: {0}")]
    MalformedCredentials(&'static str),
}

/// Why a request failed provenance or double-submit validation.
///
/// Only ever logged; clients get a bare 403.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvenanceError {
    #[error("neither Origin nor Referer header present")]
    HeadersAbsent,

    #[error("malformed {header} header: {reason}")]
    MalformedHeader { header: &'static str, reason: String },

    #[error("no target URL could be determined for the request")]
    NoTarget,

    #[error("request origin does not match any target: {details}")]
    OriginMismatch { details: String },

    #[error("invalid trusted base URL '{url}': {reason}")]
    InvalidTrustedUrl { url: String, reason: String },

    #[error("missing X-XSRF-TOKEN header")]
    TokenMissing,

    #[error("X-XSRF-TOKEN rejected: {0}")]
    TokenRejected(TokenError),

    #[error("no authenticated principal for a restricted endpoint")]
    NoPrincipal,

    #[error("X-XSRF-TOKEN issued to '{token_user}' but request authenticated as '{principal}'")]
    PrincipalMismatch {
        token_user: String,
        principal: String,
    },
}
