//! Retry/backoff knobs for a single model in the generation cascade.

use std::time::Duration;

use rand::Rng;

use crate::error_handler::{AiLlmError, env_opt_u32, env_opt_u64};

/// Per-model retry policy: `max_attempts` calls, exponential backoff with jitter.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n + rand(0..=max_jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Policy without any waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Reads the policy from env, falling back to [`RetryPolicy::default`].
    ///
    /// # Env
    /// - `LLM_RETRY_ATTEMPTS` (default 3, minimum 1)
    /// - `LLM_RETRY_BASE_MS` (default 500)
    /// - `LLM_RETRY_JITTER_MS` (default 250)
    pub fn from_env() -> Result<Self, AiLlmError> {
        let d = Self::default();
        Ok(Self {
            max_attempts: env_opt_u32("LLM_RETRY_ATTEMPTS")?
                .unwrap_or(d.max_attempts)
                .max(1),
            base_delay: env_opt_u64("LLM_RETRY_BASE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(d.base_delay),
            max_jitter: env_opt_u64("LLM_RETRY_JITTER_MS")?
                .map(Duration::from_millis)
                .unwrap_or(d.max_jitter),
        })
    }

    /// Deterministic part of the delay before retry `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Full delay before retry `attempt`: backoff plus random jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.backoff(attempt) + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let p = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(p.backoff(0), Duration::from_millis(100));
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(p.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let p = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_jitter: Duration::from_millis(5),
        };
        for _ in 0..50 {
            let d = p.delay_for(1);
            assert!(d >= Duration::from_millis(20) && d <= Duration::from_millis(25));
        }
    }
}
