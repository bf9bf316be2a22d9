use std::sync::Arc;

use axum::http::{HeaderMap, Uri, header};
use tracing::{debug, warn};
use warden_security::{SecurityContext, TokenCodec};

use super::header_check::{RequestSource, check_target};
use super::target::{TargetUrl, derive_targets, header_str, parse_trusted};
use super::xsrf::{XSRF_TOKEN_HEADER, verify_xsrf_token};
use crate::config::RequestGuardConfig;
use crate::error::ProvenanceError;

/// Rejects requests that do not originate from a trusted context.
#[derive(Debug)]
pub struct ProvenanceValidator {
    trusted: Vec<TargetUrl>,
    deny_absent_headers: bool,
    disable_token_validation: bool,
    codec: Arc<TokenCodec>,
}

impl ProvenanceValidator {
    /// # Errors
    /// `InvalidTrustedUrl` if a configured base URL does not parse.
    pub fn new(cfg: &RequestGuardConfig, codec: Arc<TokenCodec>) -> Result<Self, ProvenanceError> {
        Ok(Self {
            trusted: parse_trusted(&cfg.csrf.trusted_base_urls)?,
            deny_absent_headers: cfg.csrf.deny_absent_headers,
            disable_token_validation: cfg.csrf.disable_token_validation,
            codec,
        })
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Targets the request may originate from.
    #[must_use]
    pub fn targets(&self, uri: &Uri, headers: &HeaderMap) -> Vec<TargetUrl> {
        if self.trusted.is_empty() {
            derive_targets(uri, headers)
        } else {
            self.trusted.clone()
        }
    }

    /// Full check: headers always, the double-submit token on restricted
    /// endpoints.
    ///
    /// # Errors
    /// The first failed check.
    pub fn validate(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
        ctx: Option<&SecurityContext>,
        restricted: bool,
    ) -> Result<(), ProvenanceError> {
        self.validate_headers(uri, headers)?;
        if restricted && !self.disable_token_validation {
            self.validate_token(headers, ctx)?;
        }
        Ok(())
    }

    /// Compare `Origin` / `Referer` against every candidate target.
    ///
    /// # Errors
    /// `HeadersAbsent`, `NoTarget` or `OriginMismatch`.
    pub fn validate_headers(&self, uri: &Uri, headers: &HeaderMap) -> Result<(), ProvenanceError> {
        let source = RequestSource::new(
            header_str(headers, header::ORIGIN.as_str()),
            header_str(headers, header::REFERER.as_str()),
        );

        if source.is_absent() {
            if self.deny_absent_headers {
                warn!(path = %uri.path(), "Rejected request without Origin or Referer");
                return Err(ProvenanceError::HeadersAbsent);
            }
            debug!(path = %uri.path(), "No Origin or Referer; accepted by configuration");
            return Ok(());
        }

        let targets = self.targets(uri, headers);
        if targets.is_empty() {
            warn!(path = %uri.path(), "Rejected request: no target URL could be determined");
            return Err(ProvenanceError::NoTarget);
        }

        let mut failures = Vec::with_capacity(targets.len());
        for target in &targets {
            let info = check_target(&source, target);
            if info.is_empty() {
                debug!(%target, "Request provenance matched");
                return Ok(());
            }
            warn!(%target, failed_checks = %info, "Request provenance mismatch");
            failures.push(format!("{target} ({info})"));
        }

        Err(ProvenanceError::OriginMismatch {
            details: failures.join(", "),
        })
    }

    /// Check `X-XSRF-TOKEN` against the authenticated principal.
    ///
    /// # Errors
    /// See [`verify_xsrf_token`].
    pub fn validate_token(
        &self,
        headers: &HeaderMap,
        ctx: Option<&SecurityContext>,
    ) -> Result<(), ProvenanceError> {
        verify_xsrf_token(&self.codec, header_str(headers, XSRF_TOKEN_HEADER), ctx).inspect_err(
            |err| warn!(error = %err, "Double-submit token check failed"),
        )
    }
}
