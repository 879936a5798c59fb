use std::time::Duration;

/// Per-chunk retry budget.
///
/// Every chunk gets its own budget; a failure on one chunk never consumes
/// attempts from another.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first. `0` behaves as `1`.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier for each subsequent wait. `1.0` keeps the delay fixed.
    pub backoff_factor: f64,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_factor: 1.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between attempts, the classic behavior.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff_factor: 1.0,
            max_delay: delay.max(Duration::from_secs(30)),
        }
    }

    /// Attempts actually made per chunk.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let factor = if self.backoff_factor.is_finite() && self.backoff_factor > 0.0 {
            self.backoff_factor
        } else {
            1.0
        };
        let secs = self.initial_delay.as_secs_f64() * factor.powi(exp);
        let capped = secs.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::from_secs_f64(capped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_means_one() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(policy.attempts(), 1);
    }

    #[test]
    fn exponential_backoff_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(250),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(2),
        };
        let expected = [250, 500, 1000, 2000, 2000];
        for (i, ms) in expected.iter().enumerate() {
            assert_eq!(
                policy.delay_for_attempt((i + 1) as u32),
                Duration::from_millis(*ms)
            );
        }
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(2));
    }

    #[test]
    fn bad_factor_falls_back_to_fixed() {
        let policy = RetryPolicy {
            backoff_factor: f64::NAN,
            ..Default::default()
        };
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(1));
    }

    #[test]
    fn fixed_constructor() {
        let policy = RetryPolicy::fixed(5, Duration::from_millis(10));
        assert_eq!(policy.attempts(), 5);
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(10));
    }
}
