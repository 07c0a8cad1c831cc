//! Classified error values returned by every API call.
//!
//! [`ApiError`] is a closed tagged union: callers discriminate on the variant
//! (or on [`ApiError::kind`]) instead of inspecting message strings. Once a
//! failure has been classified it travels unchanged through the executor,
//! endpoint functions and the client facade.
//!
//! # Status mapping
//!
//! | Status | Variant |
//! |--------|---------|
//! | 401 | [`ApiError::Authentication`] |
//! | 404 | [`ApiError::NotFound`] |
//! | any other | [`ApiError::Api`] |
//! | no status (transport failure) | [`ApiError::Network`] |

use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

/// Fieldless discriminant of [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    Api,
    Network,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::NotFound => "not_found",
            Self::Api => "api",
            Self::Network => "network",
        }
    }

    /// Stable machine-readable code, e.g. `api.not_found`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "api.validation",
            Self::Authentication => "api.authentication",
            Self::NotFound => "api.not_found",
            Self::Api => "api.error",
            Self::Network => "api.network",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport failure category carried by [`ApiError::Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkFailure {
    Timeout,
    Connect,
    Other,
}

/// A failed API call, classified by cause.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Request parameters were rejected before any network call.
    #[error("{message}")]
    Validation { message: String, field: String },

    /// The upstream service rejected the credentials (HTTP 401).
    #[error("{message}")]
    Authentication {
        message: String,
        status: u16,
        endpoint: String,
        body: Option<Value>,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        message: String,
        status: u16,
        endpoint: String,
        resource: String,
        identifier: Option<String>,
        body: Option<Value>,
    },

    /// Any other non-success status, including upstream 429 responses.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        endpoint: String,
        body: Option<Value>,
    },

    /// The request never produced an HTTP status.
    #[error("{message}")]
    Network {
        message: String,
        failure: NetworkFailure,
        endpoint: String,
    },
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.into(),
        }
    }

    pub fn network(
        failure: NetworkFailure,
        message: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            failure,
            endpoint: endpoint.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Authentication { message, .. }
            | Self::NotFound { message, .. }
            | Self::Api { message, .. }
            | Self::Network { message, .. } => message,
        }
    }

    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::NotFound { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Validation { .. } | Self::Network { .. } => None,
        }
    }

    /// Path of the endpoint that failed. Validation errors have none.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Authentication { endpoint, .. }
            | Self::NotFound { endpoint, .. }
            | Self::Api { endpoint, .. }
            | Self::Network { endpoint, .. } => Some(endpoint),
            Self::Validation { .. } => None,
        }
    }

    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Authentication { body, .. }
            | Self::NotFound { body, .. }
            | Self::Api { body, .. } => body.as_ref(),
            Self::Validation { .. } | Self::Network { .. } => None,
        }
    }

    pub const fn network_failure(&self) -> Option<NetworkFailure> {
        match self {
            Self::Network { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    /// True when the upstream service itself answered 429. The local limiter
    /// never produces this; it waits instead of failing.
    pub const fn is_upstream_rate_limited(&self) -> bool {
        matches!(self, Self::Api { status: 429, .. })
    }
}

/// Maps a non-success response to its classified error.
///
/// Total and deterministic. The upstream `message` text, when present, is
/// kept verbatim.
pub fn classify(status: u16, body: &Value, path: &str) -> ApiError {
    let upstream = upstream_message(body);
    let body = (!body.is_null()).then(|| body.clone());
    let endpoint = path.to_owned();

    match status {
        401 => ApiError::Authentication {
            message: upstream
                .unwrap_or_else(|| format!("authentication failed ({})", status_text(status))),
            status,
            endpoint,
            body,
        },
        404 => {
            let (resource, identifier) = resource_from_path(path);
            let message = upstream.unwrap_or_else(|| match &identifier {
                Some(identifier) => format!("{resource} '{identifier}' not found"),
                None => format!("{resource} not found"),
            });
            ApiError::NotFound {
                message,
                status,
                endpoint,
                resource,
                identifier,
                body,
            }
        }
        _ => ApiError::Api {
            message: upstream
                .unwrap_or_else(|| format!("request failed ({})", status_text(status))),
            status,
            endpoint,
            body,
        },
    }
}

fn upstream_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_blank(text),
        Value::Object(fields) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| match fields.get(*key)? {
                Value::String(text) => non_blank(text),
                Value::Object(inner) => inner
                    .get("message")
                    .and_then(Value::as_str)
                    .and_then(non_blank),
                _ => None,
            }),
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_owned())
}

fn status_text(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

/// `/venues/42` is venue `42`; `/countries` is the collection itself.
fn resource_from_path(path: &str) -> (String, Option<String>) {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => (String::from("resource"), None),
        [.., collection, identifier] if segments.len() % 2 == 0 => {
            ((*collection).to_owned(), Some((*identifier).to_owned()))
        }
        [.., collection] => ((*collection).to_owned(), None),
    }
}

/// Error returned by typed request helpers that decode the response body.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Construction-time configuration errors. Raised before any network
/// capability exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key is required")]
    MissingApiKey,
    #[error("user agent is required")]
    MissingUserAgent,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("rate limit window {index} has zero capacity")]
    ZeroCapacity { index: usize },
    #[error("rate limit window {index} has zero duration")]
    ZeroWindow { index: usize },
    #[error("invalid rate limit profile '{value}', expected one of standard, premium, disabled")]
    InvalidProfile { value: String },
    #[error("invalid value for {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },
    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("{name} cannot be sent as an http header value")]
    InvalidHeader { name: &'static str },
    #[error("failed to build http transport: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unauthorized_keeps_upstream_message() {
        let error = classify(401, &json!({"message": "Invalid API key"}), "/countries");

        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert_eq!(error.message(), "Invalid API key");
        assert_eq!(error.status_code(), Some(401));
    }

    #[test]
    fn not_found_carries_resource_and_identifier() {
        let error = classify(404, &json!({}), "/venues/42");

        match error {
            ApiError::NotFound {
                resource,
                identifier,
                endpoint,
                message,
                ..
            } => {
                assert_eq!(resource, "venues");
                assert_eq!(identifier.as_deref(), Some("42"));
                assert_eq!(endpoint, "/venues/42");
                assert_eq!(message, "venues '42' not found");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn not_found_on_collection_has_no_identifier() {
        let error = classify(404, &Value::Null, "/venues/42/events?page=2");

        match error {
            ApiError::NotFound {
                resource, identifier, ..
            } => {
                assert_eq!(resource, "events");
                assert_eq!(identifier, None);
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn upstream_throttling_stays_generic_with_message() {
        let error = classify(429, &json!({"message": "slow down"}), "/venues");

        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.status_code(), Some(429));
        assert_eq!(error.message(), "slow down");
        assert!(error.is_upstream_rate_limited());
    }

    #[test]
    fn unknown_status_keeps_status_and_body() {
        let body = json!({"unexpected": true});
        let error = classify(599, &body, "/countries");

        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.status_code(), Some(599));
        assert_eq!(error.response_body(), Some(&body));
        assert_eq!(error.message(), "request failed (HTTP 599)");
    }

    #[test]
    fn message_falls_back_through_error_and_detail_fields() {
        let nested = classify(400, &json!({"error": {"message": "bad page"}}), "/countries");
        assert_eq!(nested.message(), "bad page");

        let detail = classify(422, &json!({"detail": "limit too large"}), "/countries");
        assert_eq!(detail.message(), "limit too large");

        let raw = classify(502, &json!("upstream exploded"), "/countries");
        assert_eq!(raw.message(), "upstream exploded");
    }

    #[test]
    fn blank_message_uses_status_reason() {
        let error = classify(503, &json!({"message": "  "}), "/countries");

        assert_eq!(error.message(), "request failed (HTTP 503 Service Unavailable)");
    }

    #[test]
    fn success_status_still_classifies_without_panicking() {
        let error = classify(200, &Value::Null, "");

        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.response_body(), None);
    }

    #[test]
    fn display_is_the_message() {
        let error = ApiError::validation("page", "page must be at least 1");

        assert_eq!(error.to_string(), "page must be at least 1");
        assert_eq!(error.code(), "api.validation");
        assert_eq!(error.endpoint(), None);
    }
}
