//! Bounded exponential backoff for transport read failures.

use std::time::Duration;

/// Backoff tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay after the first failure.
    pub initial_ms: u64,
    /// Upper bound for any single delay.
    pub max_ms: u64,
    /// Growth factor applied after each consecutive failure.
    pub multiplier: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 100,
            max_ms: 5_000,
            multiplier: 2,
        }
    }
}

/// Tracks the delay for consecutive failures. Retries are unbounded, the
/// delay is not.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    current: Duration,
    consecutive_failures: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        let current = Duration::from_millis(config.initial_ms.min(config.max_ms));
        Self {
            config,
            current,
            consecutive_failures: 0,
        }
    }

    /// Delay to wait before the next attempt. Grows the following delay.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.current = self
            .current
            .saturating_mul(self.config.multiplier.max(1))
            .min(self.max());
        delay
    }

    /// Back to the initial delay after a successful read.
    pub fn reset(&mut self) {
        self.current = Duration::from_millis(self.config.initial_ms).min(self.max());
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn max(&self) -> Duration {
        Duration::from_millis(self.config.max_ms)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
