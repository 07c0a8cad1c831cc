use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::ConfigError;

/// HTTP methods the executor issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication applied to outgoing requests. The key is opaque.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    None,
    ApiKey(String),
}

impl HttpAuth {
    pub const API_KEY_HEADER: &'static str = "x-api-key";

    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Self::None => {}
            Self::ApiKey(key) => {
                headers.insert(String::from(Self::API_KEY_HEADER), key.clone());
            }
        }
    }
}

impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: 10_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
        auth.apply(&mut self.headers);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// What went wrong below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Transport-level failure: no status code was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: HttpErrorKind,
    message: String,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Connect, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Other, message)
    }

    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, HttpErrorKind::Timeout)
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Injected transport primitive used by the executor.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn try_new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(Duration::from_millis(request.timeout_ms));

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(e.to_string())
                } else if e.is_connect() {
                    HttpError::connect(e.to_string())
                } else {
                    HttpError::other(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("reading response body: {e}"))
                } else {
                    HttpError::other(format!("reading response body: {e}"))
                }
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

enum Scripted {
    Respond(Result<HttpResponse, HttpError>),
    Stall,
}

/// Scripted transport for deterministic offline tests.
///
/// Replies are served in the order they were queued; once the script runs
/// out every call gets `200 {}`. Every request is recorded.
#[derive(Default)]
pub struct MockHttpClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Scripted::Respond(Ok(HttpResponse::new(status, body))))
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.push(Scripted::Respond(Err(error)))
    }

    /// Next call never completes, as a hung connection would.
    pub fn stall(self) -> Self {
        self.push(Scripted::Stall)
    }

    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock_requests().clone()
    }

    fn push(self, reply: Scripted) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<HttpRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HttpClient for MockHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.lock_requests().push(request);
        let reply = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        Box::pin(async move {
            match reply {
                Some(Scripted::Respond(result)) => result,
                Some(Scripted::Stall) => std::future::pending().await,
                None => Ok(HttpResponse::ok_json("{}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_auth_populates_header() {
        let request = HttpRequest::get("https://example.test/countries")
            .with_auth(&HttpAuth::ApiKey(String::from("key-123")));

        assert_eq!(request.header("X-API-Key"), Some("key-123"));
    }

    #[test]
    fn auth_debug_output_hides_the_key() {
        let auth = HttpAuth::ApiKey(String::from("secret"));

        assert!(!format!("{auth:?}").contains("secret"));
    }

    #[test]
    fn header_names_are_normalized() {
        let request = HttpRequest::get("https://example.test").with_header("User-Agent", "app/1.0");

        assert_eq!(request.headers.get("user-agent").map(String::as_str), Some("app/1.0"));
    }

    #[tokio::test]
    async fn mock_serves_script_in_order_then_defaults() {
        let mock = MockHttpClient::new()
            .respond(500, r#"{"message":"boom"}"#)
            .fail(HttpError::connect("refused"));

        let first = mock.execute(HttpRequest::get("a")).await.expect("scripted response");
        assert_eq!(first.status, 500);

        let second = mock.execute(HttpRequest::get("b")).await.expect_err("scripted error");
        assert_eq!(second.kind(), HttpErrorKind::Connect);

        let third = mock.execute(HttpRequest::get("c")).await.expect("default response");
        assert!(third.is_success());

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests()[1].url, "b");
    }
}
