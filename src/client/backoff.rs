//! Exponential reconnect backoff with jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::ReconnectConfig;

/// Delays double from `initial` up to `max`, each scaled by a random factor
/// in 0.8..=1.2. Returns `None` once `max_attempts` delays have been handed
/// out (never, if `max_attempts` is 0).
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            max,
            max_attempts,
            attempt: 0,
        }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(config.initial_delay(), config.max_delay(), config.max_attempts)
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next attempt, or `None` when attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts != 0 && self.attempt >= self.max_attempts {
            return None;
        }

        let base = self
            .initial
            .saturating_mul(2u32.saturating_pow(self.attempt.min(31)))
            .min(self.max);
        self.attempt += 1;

        let jitter = rand::thread_rng().gen_range(0.8..=1.2);
        Some(base.mul_f64(jitter))
    }

    /// Forget previous failures after a successful registration.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
