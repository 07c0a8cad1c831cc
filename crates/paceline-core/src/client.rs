//! Top-level client.
//!
//! A [`Client`] owns its own [`RateLimiter`]; two clients in one process are
//! limited independently. Endpoint methods validate their parameters first
//! and only then go through the shared [`HttpExecutor`].
//!
//! ```rust,ignore
//! use paceline_core::{Client, ClientConfig, CountriesParams, pagination};
//!
//! let client = Client::new(ClientConfig::new(api_key, "my-app/1.0"))?;
//! let body = client.countries(CountriesParams::page(1, 50)).await?;
//! let info = pagination::extract(&body);
//! println!("page {} of {}", info.page, info.total_pages());
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::executor::{HttpExecutor, RequestDescriptor};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::throttling::{RateLimitStatus, RateLimiter};
use crate::validation::{venue_descriptor, CountriesParams, VenuesParams};
use crate::{ApiError, ClientConfig, ConfigError};

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    executor: HttpExecutor,
}

impl Client {
    /// Builds a client with the reqwest transport.
    ///
    /// # Errors
    ///
    /// Configuration is validated before the transport is created.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http_client = Arc::new(ReqwestHttpClient::try_new()?);
        Self::with_http_client(config, http_client)
    }

    /// Builds a client over an injected transport.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found.
    pub fn with_http_client(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.profile));
        debug!(
            profile = %config.rate_limit.profile,
            base_url = %config.base_url,
            "client configured"
        );

        let executor = HttpExecutor::new(&config, http_client, limiter);
        Ok(Self {
            inner: Arc::new(ClientInner { config, executor }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn executor(&self) -> &HttpExecutor {
        &self.inner.executor
    }

    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.inner.executor.limiter().status()
    }

    /// `GET /countries`.
    pub async fn countries(&self, params: CountriesParams) -> Result<Value, ApiError> {
        let descriptor = params.into_descriptor()?;
        self.request(descriptor).await
    }

    /// `GET /venues`, optionally filtered by country and name.
    pub async fn venues(&self, params: VenuesParams) -> Result<Value, ApiError> {
        let descriptor = params.into_descriptor()?;
        self.request(descriptor).await
    }

    /// `GET /venues/{id}`.
    pub async fn venue(&self, id: u64) -> Result<Value, ApiError> {
        let descriptor = venue_descriptor(id)?;
        self.request(descriptor).await
    }

    /// Raw passthrough for endpoints without a dedicated method. The caller
    /// is responsible for validating `descriptor`.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        self.inner.executor.request(descriptor).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
