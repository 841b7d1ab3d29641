//! Retry policy for establishing the datastore connection.
//!
//! The policy only answers "how long to wait before the next attempt"; it
//! performs no I/O and is driven by [`ConnectionManager`](super::resilience::ConnectionManager).

use std::time::Duration;

/// Shape of the delay between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Delay doubles after each failed attempt, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

/// Bounded retry policy: at most `max_attempts` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(5000);

    /// Creates a policy. A zero attempt budget is raised to one attempt.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    pub fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self::new(max_attempts, Backoff::Exponential { initial, max })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Delay to wait after the given (1-based) failed attempt, or `None` if it
    /// was the last attempt allowed.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let delay = match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let exponent = attempt.saturating_sub(1).min(31);
                initial
                    .checked_mul(1u32 << exponent)
                    .map_or(max, |delay| delay.min(max))
            }
        };

        Some(delay)
    }

    /// Attempts left after `attempt` attempts have been made.
    pub fn remaining_after(&self, attempt: u32) -> u32 {
        self.max_attempts.saturating_sub(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff(), Backoff::Fixed(Duration::from_millis(5000)));
    }

    #[test]
    fn test_fixed_delay_until_budget_is_spent() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(100));

        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(3), None);
        assert_eq!(policy.remaining_after(1), 2);
        assert_eq!(policy.remaining_after(3), 0);
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let policy = RetryPolicy::fixed(1, Duration::from_secs(60));
        assert_eq!(policy.delay_after(1), None);
    }

    #[test]
    fn test_zero_attempts_is_raised_to_one() {
        let policy = RetryPolicy::fixed(0, Duration::from_millis(10));
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_exponential_doubles_and_caps() {
        let policy =
            RetryPolicy::exponential(6, Duration::from_millis(100), Duration::from_millis(500));

        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(5), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(6), None);
    }
}
