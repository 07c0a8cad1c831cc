//! Sliding-window admission control shared by every request of a client.
//!
//! A [`RateLimiter`] owns one or more windows. A slot is granted only when
//! every window has spare capacity, and the grant is recorded in all of them
//! at once. Callers that must wait are admitted strictly in arrival order.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::rate_limit::{RateLimitProfile, WindowSpec};
use crate::ConfigError;

/// Added to every computed wake time so a sleeper never re-checks exactly on
/// the expiry boundary.
const SAFETY_MARGIN: Duration = Duration::from_millis(5);

#[derive(Debug)]
struct Window {
    spec: WindowSpec,
    granted: VecDeque<Instant>,
}

impl Window {
    fn new(spec: WindowSpec) -> Self {
        Self {
            spec,
            granted: VecDeque::with_capacity(spec.capacity.min(1_024) as usize),
        }
    }

    /// Drops grants strictly older than the window.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.granted.front() {
            if now.duration_since(oldest) <= self.spec.duration {
                break;
            }
            self.granted.pop_front();
        }
    }

    /// Instant at which this window next has a free slot, or `None` if it
    /// has one already.
    fn frees_at(&self) -> Option<Instant> {
        let capacity = self.spec.capacity as usize;
        if self.granted.len() < capacity {
            return None;
        }
        let blocking = self.granted.len() - capacity;
        self.granted
            .get(blocking)
            .map(|&granted_at| granted_at + self.spec.duration)
    }
}

/// Usage of a single window at the last admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUsage {
    pub used: u32,
    pub capacity: u32,
    pub window: Duration,
    /// When the oldest recorded grant leaves the window.
    pub reset_at: Option<Instant>,
}

impl WindowUsage {
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    pub const fn is_saturated(&self) -> bool {
        self.used >= self.capacity
    }
}

/// Read-only snapshot returned by [`RateLimiter::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub profile: RateLimitProfile,
    pub windows: Vec<WindowUsage>,
}

/// Instance-owned sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    profile: RateLimitProfile,
    unlimited: bool,
    windows: Mutex<Vec<Window>>,
    // Fair (FIFO) async lock; holding it is the right to run the capacity check.
    queue: tokio::sync::Mutex<()>,
}

impl RateLimiter {
    /// Creates a limiter enforcing the preset windows of `profile`.
    pub fn new(profile: RateLimitProfile) -> Self {
        Self::build(profile, profile.windows())
    }

    /// Creates a limiter with explicit windows.
    ///
    /// # Errors
    ///
    /// Rejects any window with zero capacity or zero duration; such a window
    /// would starve every caller.
    pub fn with_windows(
        profile: RateLimitProfile,
        windows: Vec<WindowSpec>,
    ) -> Result<Self, ConfigError> {
        for (index, spec) in windows.iter().enumerate() {
            if spec.capacity == 0 {
                return Err(ConfigError::ZeroCapacity { index });
            }
            if spec.duration.is_zero() {
                return Err(ConfigError::ZeroWindow { index });
            }
        }
        Ok(Self::build(profile, windows))
    }

    fn build(profile: RateLimitProfile, windows: Vec<WindowSpec>) -> Self {
        let unlimited = profile == RateLimitProfile::Disabled || windows.is_empty();
        let windows = if unlimited {
            Vec::new()
        } else {
            windows.into_iter().map(Window::new).collect()
        };
        Self {
            profile,
            unlimited,
            windows: Mutex::new(windows),
            queue: tokio::sync::Mutex::new(()),
        }
    }

    pub const fn profile(&self) -> RateLimitProfile {
        self.profile
    }

    /// Waits until every window has room, then records the grant.
    ///
    /// Waiters are admitted in the order they called `reserve`. Dropping the
    /// returned future before it completes records nothing and lets the next
    /// waiter proceed.
    pub async fn reserve(&self) {
        if self.unlimited {
            return;
        }

        let _turn = self.queue.lock().await;
        loop {
            let now = Instant::now();
            let wake_at = match self.admit(now) {
                Ok(()) => {
                    trace!(profile = %self.profile, "rate limit slot granted");
                    return;
                }
                Err(wake_at) => wake_at,
            };

            debug!(
                profile = %self.profile,
                wait_ms = wake_at.saturating_duration_since(now).as_millis() as u64,
                "rate limit saturated; waiting for a slot"
            );
            tokio::time::sleep_until(wake_at + SAFETY_MARGIN).await;
        }
    }

    /// Grants a slot only if one is free right now and nobody is queued.
    ///
    /// On refusal returns the suggested delay before trying again.
    pub fn try_reserve(&self) -> Result<(), Duration> {
        if self.unlimited {
            return Ok(());
        }

        let now = Instant::now();
        let Ok(_turn) = self.queue.try_lock() else {
            let wake_at = self.lock_windows().iter().filter_map(Window::frees_at).max();
            return Err(wake_at.map_or(SAFETY_MARGIN, |at| {
                at.saturating_duration_since(now) + SAFETY_MARGIN
            }));
        };

        self.admit(now)
            .map_err(|wake_at| wake_at.saturating_duration_since(now) + SAFETY_MARGIN)
    }

    /// Usage per window as of the last admission check. Does not prune, so
    /// repeated calls without an intervening reservation agree.
    pub fn status(&self) -> RateLimitStatus {
        let windows = self
            .lock_windows()
            .iter()
            .map(|window| WindowUsage {
                used: u32::try_from(window.granted.len()).unwrap_or(u32::MAX),
                capacity: window.spec.capacity,
                window: window.spec.duration,
                reset_at: window
                    .granted
                    .front()
                    .map(|&oldest| oldest + window.spec.duration),
            })
            .collect();

        RateLimitStatus {
            profile: self.profile,
            windows,
        }
    }

    /// Check-then-record under one lock. `Err` carries the instant at which
    /// the most constraining window frees a slot.
    fn admit(&self, now: Instant) -> Result<(), Instant> {
        let mut windows = self.lock_windows();
        for window in windows.iter_mut() {
            window.prune(now);
        }

        if let Some(wake_at) = windows.iter().filter_map(Window::frees_at).max() {
            return Err(wake_at);
        }

        for window in windows.iter_mut() {
            window.granted.push_back(now);
        }
        Ok(())
    }

    fn lock_windows(&self) -> MutexGuard<'_, Vec<Window>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
