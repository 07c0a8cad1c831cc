//! Rate-limited request execution.
//!
//! [`HttpExecutor::request`] is the single path every endpoint call takes:
//!
//! 1. reserve a slot from the [`RateLimiter`] (may wait)
//! 2. serialize query parameters, dropping absent ones
//! 3. call the transport under the configured timeout
//! 4. classify failures into [`ApiError`]
//! 5. hand back the success body as received
//!
//! The executor never retries. A retry costs another rate-limit slot, so the
//! decision belongs to the caller (see [`crate::retry`]).

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn, Span};

use crate::error::{classify, ApiError, ClientError, NetworkFailure};
use crate::http_client::{HttpAuth, HttpClient, HttpErrorKind, HttpMethod, HttpRequest};
use crate::throttling::RateLimiter;
use crate::ClientConfig;

/// Primitive query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One API call, as built by an endpoint function.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    /// Kept in caller order; `None` entries are never sent.
    pub query: Vec<(String, Option<ParamValue>)>,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.push((name.into(), Some(value.into())));
        self
    }

    pub fn param_opt<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.query.push((name.into(), value.map(Into::into)));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Percent-encoded `name=value` pairs joined by `&`, absent values dropped.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .filter_map(|(name, value)| {
                value.as_ref().map(|value| {
                    format!(
                        "{}={}",
                        urlencoding::encode(name),
                        urlencoding::encode(&value.to_string())
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Composes the rate limiter, the transport and error classification.
pub struct HttpExecutor {
    http_client: Arc<dyn HttpClient>,
    limiter: Arc<RateLimiter>,
    base_url: String,
    auth: HttpAuth,
    user_agent: String,
    language: Option<String>,
    timeout: Duration,
}

impl HttpExecutor {
    pub fn new(
        config: &ClientConfig,
        http_client: Arc<dyn HttpClient>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            http_client,
            limiter,
            base_url: config.base_url.trim().trim_end_matches('/').to_owned(),
            auth: HttpAuth::ApiKey(config.api_key.clone()),
            user_agent: config.user_agent.clone(),
            language: config.language.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn url_for(&self, descriptor: &RequestDescriptor) -> String {
        let separator = if descriptor.path.starts_with('/') { "" } else { "/" };
        let mut url = format!("{}{separator}{}", self.base_url, descriptor.path);
        let query = descriptor.query_string();
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        url
    }

    /// Executes one call and returns the response body untouched.
    ///
    /// Consumes exactly one rate-limit slot and makes exactly one transport
    /// call, whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when no response arrived (including timeout),
    /// otherwise the classification of the non-success status.
    #[instrument(
        name = "api_request",
        skip(self, descriptor),
        fields(
            http.method = %descriptor.method,
            http.path = %descriptor.path,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        self.limiter.reserve().await;

        let timeout = descriptor.timeout.unwrap_or(self.timeout);
        let request = self.build_request(&descriptor, timeout);
        debug!(url = %request.url, timeout_ms = timeout.as_millis() as u64, "dispatching request");

        let attempt = tokio::time::timeout(timeout, self.http_client.execute(request));
        let response = match attempt.await {
            Err(_elapsed) => {
                let error = ApiError::network(
                    NetworkFailure::Timeout,
                    format!(
                        "request to {} timed out after {} ms",
                        descriptor.path,
                        timeout.as_millis()
                    ),
                    &descriptor.path,
                );
                warn!(kind = %error.kind(), "{error}");
                return Err(error);
            }
            Ok(Err(transport)) => {
                let (failure, message) = match transport.kind() {
                    HttpErrorKind::Timeout => (
                        NetworkFailure::Timeout,
                        format!("request to {} timed out: {transport}", descriptor.path),
                    ),
                    HttpErrorKind::Connect => (
                        NetworkFailure::Connect,
                        format!("connection failed for {}: {transport}", descriptor.path),
                    ),
                    HttpErrorKind::Other => (
                        NetworkFailure::Other,
                        format!("request to {} failed: {transport}", descriptor.path),
                    ),
                };
                let error = ApiError::network(failure, message, &descriptor.path);
                warn!(kind = %error.kind(), "{error}");
                return Err(error);
            }
            Ok(Ok(response)) => response,
        };

        Span::current().record("http.status_code", response.status);
        let body = parse_body(&response.body);

        if !response.is_success() {
            let error = classify(response.status, &body, &descriptor.path);
            warn!(status = response.status, kind = %error.kind(), "{error}");
            return Err(error);
        }

        Ok(body)
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] carries the classified error unchanged;
    /// [`ClientError::Decode`] means the body did not match `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ClientError> {
        let body = self.request(descriptor).await?;
        Ok(serde_json::from_value(body)?)
    }

    fn build_request(&self, descriptor: &RequestDescriptor, timeout: Duration) -> HttpRequest {
        let mut request = HttpRequest::new(descriptor.method, self.url_for(descriptor))
            .with_auth(&self.auth)
            .with_header("user-agent", &self.user_agent)
            .with_header("accept", "application/json")
            .with_timeout_ms(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        if let Some(language) = &self.language {
            request = request.with_header("accept-language", language);
        }
        request
    }
}

/// JSON when possible, the raw text otherwise, `Null` when empty.
fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rate_limit::RateLimitProfile;
    use crate::MockHttpClient;

    fn executor(mock: Arc<MockHttpClient>) -> HttpExecutor {
        let config = ClientConfig::new("key-123", "paceline-tests/1.0")
            .with_base_url("https://api.example.test/v1/")
            .with_language("de-DE");
        HttpExecutor::new(
            &config,
            mock,
            Arc::new(RateLimiter::new(RateLimitProfile::Disabled)),
        )
    }

    #[test]
    fn absent_params_are_dropped_and_order_is_kept() {
        let descriptor = RequestDescriptor::get("/venues")
            .param("page", 2u32)
            .param_opt::<String>("country", None)
            .param("name", "Café & Bar")
            .param_opt("open", Some(true));

        assert_eq!(
            descriptor.query_string(),
            "page=2&name=Caf%C3%A9%20%26%20Bar&open=true"
        );
    }

    #[test]
    fn url_joins_base_and_path() {
        let executor = executor(Arc::new(MockHttpClient::new()));

        assert_eq!(
            executor.url_for(&RequestDescriptor::get("countries").param("page", 1u32)),
            "https://api.example.test/v1/countries?page=1"
        );
        assert_eq!(
            executor.url_for(&RequestDescriptor::get("/countries")),
            "https://api.example.test/v1/countries"
        );
    }

    #[tokio::test]
    async fn request_carries_credentials_and_locale() {
        let mock = Arc::new(MockHttpClient::new());
        let executor = executor(Arc::clone(&mock));

        executor
            .request(RequestDescriptor::get("/countries"))
            .await
            .expect("default mock reply succeeds");

        let sent = &mock.requests()[0];
        assert_eq!(sent.header("x-api-key"), Some("key-123"));
        assert_eq!(sent.header("user-agent"), Some("paceline-tests/1.0"));
        assert_eq!(sent.header("accept-language"), Some("de-DE"));
        assert_eq!(sent.timeout_ms, 10_000);
    }

    #[tokio::test]
    async fn success_body_is_returned_untouched() {
        let raw = r#"{"results":[{"id":1}],"extra":{"x":null}}"#;
        let mock = Arc::new(MockHttpClient::new().respond(200, raw));
        let executor = executor(mock);

        let body = executor
            .request(RequestDescriptor::get("/countries"))
            .await
            .expect("success");

        assert_eq!(body, json!({"results":[{"id":1}],"extra":{"x":null}}));
    }

    #[tokio::test]
    async fn non_json_and_empty_bodies_are_preserved() {
        let mock = Arc::new(MockHttpClient::new().respond(200, "plain text").respond(204, ""));
        let executor = executor(mock);

        let text = executor.request(RequestDescriptor::get("/a")).await.expect("success");
        let empty = executor.request(RequestDescriptor::get("/b")).await.expect("success");

        assert_eq!(text, Value::String(String::from("plain text")));
        assert_eq!(empty, Value::Null);
    }

    #[tokio::test]
    async fn html_error_page_keeps_raw_body_as_message() {
        let mock = Arc::new(MockHttpClient::new().respond(502, "<html>Bad Gateway</html>"));
        let executor = executor(mock);

        let error = executor
            .request(RequestDescriptor::get("/countries"))
            .await
            .expect_err("502 must fail");

        assert_eq!(error.status_code(), Some(502));
        assert_eq!(error.message(), "<html>Bad Gateway</html>");
    }

    #[tokio::test]
    async fn request_as_decodes_or_reports_decode_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct Page {
            page: u32,
        }

        let mock = Arc::new(
            MockHttpClient::new()
                .respond(200, r#"{"page":3}"#)
                .respond(200, r#"{"page":"x"}"#),
        );
        let executor = executor(mock);

        let page: Page = executor
            .request_as(RequestDescriptor::get("/countries"))
            .await
            .expect("decodes");
        assert_eq!(page.page, 3);

        let error = executor
            .request_as::<Page>(RequestDescriptor::get("/countries"))
            .await
            .expect_err("wrong shape");
        assert!(matches!(error, ClientError::Decode(_)));
    }
}
