//! Retry policy for the smoke client
//!
//! Exponential backoff: the first retry goes out immediately, then
//! `factor · 2^(n-1)` seconds, never more than [`MAX_BACKOFF`].

use std::time::Duration;

use reqwest::StatusCode;

/// Upper bound for a single backoff sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 6,
            backoff_factor: Duration::from_millis(700),
            retry_statuses: vec![
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_factor: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Sleep before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exp = 2u32.saturating_pow(retry - 1);
        self.backoff_factor.saturating_mul(exp).min(MAX_BACKOFF)
    }
}
