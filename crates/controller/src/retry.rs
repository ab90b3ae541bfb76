//! Bounded exponential backoff for status-toggle retries.

use std::time::Duration;

/// Retry policy for [`StatusToggleCoordinator`](crate::StatusToggleCoordinator).
#[derive(Debug, Clone)]
pub struct ToggleRetryConfig {
    /// Total attempts allowed, counting the first one.
    pub max_retries: u32,
    /// When `false`, the first failure is final.
    pub retry_enabled: bool,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Log every attempt, not just the terminal outcome.
    pub log_attempts: bool,
}

impl Default for ToggleRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_enabled: true,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            multiplier: 2.0,
            log_attempts: false,
        }
    }
}

impl ToggleRetryConfig {
    /// No waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        self.retry_enabled && attempt < self.max_retries
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ToggleRetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ToggleRetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let config = ToggleRetryConfig::default();
        let d = next_delay(Duration::from_millis(500), &config);
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = ToggleRetryConfig::default();
        let d = next_delay(Duration::from_secs(3), &config);
        assert_eq!(d, Duration::from_secs(4));
    }

    #[test]
    fn full_backoff_sequence() {
        let config = ToggleRetryConfig::default();
        let mut delay = config.initial_delay;
        let expected = [500, 1000, 2000, 4000, 4000];

        for &expected_ms in &expected {
            assert_eq!(delay.as_millis(), expected_ms);
            delay = next_delay(delay, &config);
        }
    }

    #[test]
    fn three_retries_allow_three_attempts() {
        let config = ToggleRetryConfig::default();
        assert!(config.allows_retry_after(1));
        assert!(config.allows_retry_after(2));
        assert!(!config.allows_retry_after(3));
    }

    #[test]
    fn disabled_retry_stops_after_first_attempt() {
        let config = ToggleRetryConfig {
            retry_enabled: false,
            ..Default::default()
        };
        assert!(!config.allows_retry_after(1));
    }

    #[test]
    fn immediate_config_never_waits() {
        let config = ToggleRetryConfig::immediate(5);
        assert_eq!(next_delay(config.initial_delay, &config), Duration::ZERO);
        assert!(config.allows_retry_after(4));
    }
}
