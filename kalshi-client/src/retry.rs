//! Retry policy for the request pipeline
//!
//! Decides, from an error classification and the attempt count, whether a
//! failed request is sent again and how long to wait first.

use std::time::Duration;

use rand::Rng;

use kalshi_core::{ErrorKind, KalshiError};

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Upper bound of the random jitter added to every backoff
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);
/// Longest server `Retry-After` hint that is honoured
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Per-call retry bookkeeping; lives only as long as one logical call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Zero-based attempt counter
    pub attempt: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    DoNotRetry,
}

/// Exponential backoff with jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_jitter: DEFAULT_MAX_JITTER,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_max_retry_after(mut self, max_retry_after: Duration) -> Self {
        self.max_retry_after = max_retry_after;
        self
    }

    /// Decide what to do after `error` ended attempt `state.attempt`
    ///
    /// Authentication, client, malformed-response, validation and config
    /// failures are never retried. Rate limits, server errors and network
    /// failures are retried until `max_retries` retries have been made.
    pub fn decide(&self, error: &KalshiError, state: &RetryState) -> RetryDecision {
        if !self.is_retryable(error.kind()) || state.attempt >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }

        let jitter = self.sample_jitter();
        let mut delay = self.backoff(state.attempt, jitter);

        // A server hint can lengthen the wait, up to `max_retry_after`
        if let KalshiError::RateLimited {
            retry_after: Some(hint),
            ..
        } = error
        {
            delay = delay.max((*hint).min(self.max_retry_after));
        }

        RetryDecision::RetryAfter(delay)
    }

    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        kind.is_transient()
    }

    /// `base_delay * 2^attempt + jitter`, saturating instead of overflowing
    pub fn backoff(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).saturating_add(jitter)
    }

    fn sample_jitter(&self) -> Duration {
        let max_millis = self.max_jitter.as_millis() as u64;
        if max_millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_millis))
    }
}
