use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const SECOND: Duration = Duration::from_secs(1);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Named request budget preset. Fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitProfile {
    /// Free tier: 2 requests per second, 1 000 per day.
    #[default]
    Standard,
    /// Paid tier: 10 requests per second, 50 000 per day.
    Premium,
    /// No limiting at all.
    Disabled,
}

impl RateLimitProfile {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Premium, Self::Disabled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Disabled => "disabled",
        }
    }

    /// Windows enforced by this profile. Empty for [`RateLimitProfile::Disabled`].
    pub fn windows(self) -> Vec<WindowSpec> {
        match self {
            Self::Standard => vec![WindowSpec::new(2, SECOND), WindowSpec::new(1_000, DAY)],
            Self::Premium => vec![WindowSpec::new(10, SECOND), WindowSpec::new(50_000, DAY)],
            Self::Disabled => Vec::new(),
        }
    }
}

impl Display for RateLimitProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateLimitProfile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            "disabled" => Ok(Self::Disabled),
            other => Err(ConfigError::InvalidProfile {
                value: other.to_owned(),
            }),
        }
    }
}

/// One sliding window: at most `capacity` grants per `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSpec {
    pub capacity: u32,
    pub duration: Duration,
}

impl WindowSpec {
    pub const fn new(capacity: u32, duration: Duration) -> Self {
        Self { capacity, duration }
    }

    pub fn per_second(capacity: u32) -> Self {
        Self::new(capacity, SECOND)
    }

    pub fn per_day(capacity: u32) -> Self {
        Self::new(capacity, DAY)
    }
}

/// Rate-limit section of the client configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub profile: RateLimitProfile,
}

impl RateLimitConfig {
    pub const fn new(profile: RateLimitProfile) -> Self {
        Self { profile }
    }
}
