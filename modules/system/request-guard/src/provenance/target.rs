//! Target URLs a request is allowed to originate from.

use std::fmt;

use axum::http::{HeaderMap, Uri, header};
use url::Url;

use crate::error::ProvenanceError;

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `{protocol, host, port}` triple compared against `Origin` and `Referer`.
///
/// Ports are always explicit: 80 for `http` and 443 for `https` when the URL
/// leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl TargetUrl {
    /// Parse an absolute URL. Path, query and fragment are ignored.
    ///
    /// # Errors
    /// Returns the parse failure as a human readable reason.
    pub fn parse(value: &str) -> Result<Self, String> {
        let url = Url::parse(value.trim()).map_err(|e| e.to_string())?;
        let host = url
            .host_str()
            .ok_or_else(|| "URL has no host".to_owned())?
            .to_ascii_lowercase();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| format!("no default port for scheme '{}'", url.scheme()))?;
        Ok(Self {
            scheme: url.scheme().to_owned(),
            host,
            port,
        })
    }

    /// Build a target from a scheme and an `authority` (`host[:port]`).
    fn from_authority(scheme: &str, authority: &str) -> Option<Self> {
        Self::parse(&format!("{scheme}://{authority}")).ok()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Parse the configured trusted base URLs.
///
/// # Errors
/// `InvalidTrustedUrl` for the first URL that does not parse.
pub fn parse_trusted(urls: &[String]) -> Result<Vec<TargetUrl>, ProvenanceError> {
    urls.iter()
        .map(|raw| {
            TargetUrl::parse(raw).map_err(|reason| ProvenanceError::InvalidTrustedUrl {
                url: raw.clone(),
                reason,
            })
        })
        .collect()
}

/// Targets derived from the request itself: its own URL, plus one target per
/// host named in `X-Forwarded-Host`.
#[must_use]
pub fn derive_targets(uri: &Uri, headers: &HeaderMap) -> Vec<TargetUrl> {
    let own_scheme = uri.scheme_str().unwrap_or("http");

    let mut targets = Vec::new();
    let own_authority = uri
        .authority()
        .map(|a| a.as_str().to_owned())
        .or_else(|| header_str(headers, header::HOST.as_str()).map(str::to_owned));
    if let Some(authority) = own_authority
        && let Some(target) = TargetUrl::from_authority(own_scheme, &authority)
    {
        targets.push(target);
    }

    if let Some(forwarded_hosts) = header_str(headers, X_FORWARDED_HOST) {
        let forwarded_scheme = header_str(headers, X_FORWARDED_PROTO)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(own_scheme);

        for host in forwarded_hosts.split(',').map(str::trim).filter(|h| !h.is_empty()) {
            match TargetUrl::from_authority(forwarded_scheme, host) {
                Some(target) if !targets.contains(&target) => targets.push(target),
                Some(_) => {}
                None => tracing::debug!(host, "Ignoring unparsable X-Forwarded-Host entry"),
            }
        }
    }

    targets
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
