//! Client configuration.
//!
//! A [`ClientConfig`] can be built in code, deserialized with serde, or read
//! from `PACELINE_*` environment variables. [`ClientConfig::validate`] runs
//! before any transport is created, so a missing credential fails fast.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::Deserialize;

use crate::rate_limit::{RateLimitConfig, RateLimitProfile};
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.paceline.io/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_API_KEY: &str = "PACELINE_API_KEY";
pub const ENV_USER_AGENT: &str = "PACELINE_USER_AGENT";
pub const ENV_TIMEOUT_MS: &str = "PACELINE_TIMEOUT_MS";
pub const ENV_LANGUAGE: &str = "PACELINE_LANGUAGE";
pub const ENV_BASE_URL: &str = "PACELINE_BASE_URL";
pub const ENV_RATE_LIMIT_PROFILE: &str = "PACELINE_RATE_LIMIT_PROFILE";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub user_agent: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Locale tag forwarded as `accept-language`.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_base_url() -> String {
    String::from(DEFAULT_BASE_URL)
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user_agent: user_agent.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            language: None,
            base_url: default_base_url(),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Reads configuration from `PACELINE_*` variables. Unset optional
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for unparsable values and for anything
    /// [`validate`](Self::validate) rejects.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(
            lookup(ENV_API_KEY).unwrap_or_default(),
            lookup(ENV_USER_AGENT).unwrap_or_default(),
        );

        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
                name: ENV_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_LANGUAGE).filter(|v| !v.trim().is_empty()) {
            config.language = Some(value);
        }
        if let Some(value) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = value;
        }
        if let Some(value) = lookup(ENV_RATE_LIMIT_PROFILE) {
            config.rate_limit.profile = value.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_profile(mut self, profile: RateLimitProfile) -> Self {
        self.rate_limit.profile = profile;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// # Errors
    ///
    /// Empty API key or user agent, a header field that is not a legal
    /// header value, zero timeout, or a base URL that is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingUserAgent);
        }
        check_header("api_key", &self.api_key)?;
        check_header("user_agent", &self.user_agent)?;
        if let Some(language) = &self.language {
            check_header("language", language)?;
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }
        Ok(())
    }
}

fn check_header(name: &'static str, value: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(value)
        .map(drop)
        .map_err(|_| ConfigError::InvalidHeader { name })
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("timeout_ms", &self.timeout_ms)
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
