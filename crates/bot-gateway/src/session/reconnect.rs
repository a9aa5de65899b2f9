//! Reconnect policy

use std::time::Duration;

/// Bounded linear backoff
///
/// Attempt `n` (1-based) waits `n × base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    /// Default number of consecutive reconnect attempts
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default backoff step
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(3000);

    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before attempt `attempt`
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Check if attempt `attempt` is still allowed
    #[must_use]
    pub const fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_retries
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_BASE_DELAY)
    }
}
