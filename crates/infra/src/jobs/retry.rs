//! Retry policies.

use std::time::Duration;

/// Attempt budget with linear backoff: after failed attempt `n` the caller
/// waits `n * step` before trying again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts (0 = never try)
    pub max_attempts: u32,
    /// Backoff step; the wait grows by this much per failed attempt
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::webhook_delivery(5, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Webhook delivery: waits `2 * attempt` time-units after a failed attempt.
    pub fn webhook_delivery(max_attempts: u32, time_unit: Duration) -> Self {
        Self {
            max_attempts,
            step: time_unit.saturating_mul(2),
        }
    }

    /// Status polling: waits `attempt` time-units after a failed attempt.
    pub fn status_polling(max_attempts: u32, time_unit: Duration) -> Self {
        Self {
            max_attempts,
            step: time_unit,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
