use std::time::Duration;

use paceline_core::{PaginationInfo, RateLimitProfile, RateLimitStatus};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::error::CliError;

/// Document printed for every command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pagination: Vec<PaginationInfo>,
    pub rate_limit: RateLimitReport,
}

impl CommandOutput {
    pub fn new(data: Value, rate_limit: RateLimitReport) -> Self {
        Self {
            data,
            pagination: Vec::new(),
            rate_limit,
        }
    }

    pub fn with_pagination(mut self, pagination: Vec<PaginationInfo>) -> Self {
        self.pagination = pagination;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitReport {
    pub profile: RateLimitProfile,
    pub windows: Vec<WindowReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowReport {
    pub capacity: u32,
    pub window_ms: u64,
    pub used: u32,
    pub remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets_in_ms: Option<u64>,
}

impl RateLimitReport {
    pub fn from_status(status: &RateLimitStatus) -> Self {
        let now = Instant::now();
        Self {
            profile: status.profile,
            windows: status
                .windows
                .iter()
                .map(|usage| WindowReport {
                    capacity: usage.capacity,
                    window_ms: millis(usage.window),
                    used: usage.used,
                    remaining: usage.remaining(),
                    resets_in_ms: usage
                        .reset_at
                        .map(|reset_at| millis(reset_at.saturating_duration_since(now))),
                })
                .collect(),
        }
    }

    /// Windows of `profile` with nothing used yet.
    pub fn idle(profile: RateLimitProfile) -> Self {
        Self {
            profile,
            windows: profile
                .windows()
                .into_iter()
                .map(|spec| WindowReport {
                    capacity: spec.capacity,
                    window_ms: millis(spec.duration),
                    used: 0,
                    remaining: spec.capacity,
                    resets_in_ms: None,
                })
                .collect(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub fn render(output: &CommandOutput, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    println!("{payload}");
    Ok(())
}
