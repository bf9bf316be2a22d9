//! RFC 9457 problem responses and the `WWW-Authenticate` challenge.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Problem details document (RFC 9457).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, title: &str, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.to_owned(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", "Request rejected")
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

/// Bearer challenge sent with every 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub error: String,
    pub description: String,
}

impl BearerChallenge {
    #[must_use]
    pub fn new(realm: &str, error: &str, description: &str) -> Self {
        Self {
            realm: realm.to_owned(),
            error: error.to_owned(),
            description: description.to_owned(),
        }
    }

    /// `Bearer realm="...", error="...", error_description="..."`
    #[must_use]
    pub fn header_value(&self) -> String {
        format!(
            "Bearer realm=\"{}\", error=\"{}\", error_description=\"{}\"",
            quote_safe(&self.realm),
            quote_safe(&self.error),
            quote_safe(&self.description)
        )
    }

    /// 401 problem response carrying this challenge.
    #[must_use]
    pub fn into_unauthorized(self) -> Response {
        let mut response =
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", self.description.clone())
                .into_response();
        if let Ok(value) = HeaderValue::from_str(&self.header_value()) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

fn quote_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '\'' } else { c })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn challenge_format() {
        let challenge = BearerChallenge::new("app.example.com", "invalid_token", "Authentication failed");
        assert_eq!(
            challenge.header_value(),
            r#"Bearer realm="app.example.com", error="invalid_token", error_description="Authentication failed""#
        );
    }

    #[test]
    fn challenge_strips_quotes_and_control_chars() {
        let challenge = BearerChallenge::new("a\"b", "x\ny", "say \"hi\"");
        assert_eq!(
            challenge.header_value(),
            r#"Bearer realm="a'b", error="xy", error_description="say 'hi'""#
        );
    }

    #[test]
    fn unauthorized_response_has_header_and_problem_type() {
        let response = BearerChallenge::new("h", "invalid_request", "Missing credentials")
            .into_unauthorized();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            PROBLEM_CONTENT_TYPE
        );
    }

    #[test]
    fn forbidden_problem() {
        let response = Problem::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
