use crate::config::RetryPolicy;
use std::time::Duration;

/// Tracks consecutive data source failures for one work unit and derives
/// the wait before the next attempt: `base * multiplier^(n-1)`, capped at
/// the policy maximum.
///
/// Once failures reach the attempt budget the unit counts as degraded. A
/// degraded unit never gives up; it keeps retrying at the cap while its
/// owner republishes the last known signal as stale.
#[derive(Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    failures: u32,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Records a failure and returns how long to wait before the next try
    pub fn on_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.current_delay()
    }

    /// Clears the failure streak after a successful call
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_degraded(&self) -> bool {
        self.failures >= self.policy.max_attempts
    }

    /// True exactly once, on the failure that crossed the attempt budget
    pub fn just_degraded(&self) -> bool {
        self.failures == self.policy.max_attempts
    }

    fn current_delay(&self) -> Duration {
        if self.failures == 0 {
            return self.policy.base_delay;
        }
        // Clamp the exponent so the multiplication cannot overflow before
        // the cap applies
        let exponent = (self.failures - 1).min(12);
        let delay = self
            .policy
            .base_delay
            .saturating_mul(self.policy.multiplier.saturating_pow(exponent));
        delay.min(self.policy.max_delay)
    }
}
