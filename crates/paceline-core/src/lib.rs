//! # Paceline Core
//!
//! Rate-limited HTTP execution core for a paginated REST API.
//!
//! ## Overview
//!
//! Every endpoint call takes the same path:
//!
//! - **Validation** rejects malformed parameters before anything else runs
//! - **Rate limiter** admits the call under every active window, in FIFO order
//! - **HTTP executor** issues exactly one transport call under a timeout
//! - **Error taxonomy** classifies failures into a closed set of kinds
//! - **Pagination extractor** reads page metadata from the returned body
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client facade and endpoint methods |
//! | [`config`] | Client configuration and environment loading |
//! | [`error`] | Classified API errors and configuration errors |
//! | [`executor`] | Request descriptors and the rate-limited executor |
//! | [`http_client`] | Transport trait, reqwest transport, scripted mock |
//! | [`pagination`] | Pagination metadata extraction |
//! | [`rate_limit`] | Rate-limit profiles and window presets |
//! | [`retry`] | Opt-in caller-side retries with backoff |
//! | [`throttling`] | Sliding-window rate limiter |
//! | [`validation`] | Endpoint parameter schemas |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Client (facade) │──── validate params ──▶ ApiError::Validation
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  HttpExecutor   │────▶│   RateLimiter    │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  HttpClient     │────▶│ classify(status) │
//! │ (reqwest/mock)  │     └──────────────────┘
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use paceline_core::{ApiError, ErrorKind};
//!
//! fn describe(error: &ApiError) -> String {
//!     match error.kind() {
//!         ErrorKind::Validation => format!("fix your input: {error}"),
//!         ErrorKind::Authentication => String::from("check the API key"),
//!         ErrorKind::NotFound => format!("nothing at {}", error.endpoint().unwrap_or("?")),
//!         ErrorKind::Api if error.is_upstream_rate_limited() => String::from("slow down"),
//!         ErrorKind::Api | ErrorKind::Network => error.to_string(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The API key is sent as a header, never in the URL
//! - `Debug` output of configuration and auth redacts the key

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod pagination;
pub mod rate_limit;
pub mod retry;
pub mod throttling;
pub mod validation;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{classify, ApiError, ClientError, ConfigError, ErrorKind, NetworkFailure};
pub use executor::{HttpExecutor, ParamValue, RequestDescriptor};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    MockHttpClient, ReqwestHttpClient,
};
pub use pagination::PaginationInfo;
pub use rate_limit::{RateLimitConfig, RateLimitProfile, WindowSpec};
pub use retry::{Backoff, RetryConfig};
pub use throttling::{RateLimitStatus, RateLimiter, WindowUsage};
pub use validation::{CountriesParams, PageParams, VenuesParams};
