//! Retry classification and backoff hints
//!
//! This module decides whether a failed request is worth re-issuing and how
//! long to wait first. It never sleeps and never loops: the retry loop
//! belongs to the caller (a query or cache layer), which consults:
//! - [`ApiError::is_retryable`] / [`is_retryable`] for the verdict
//! - [`parse_retry_delay`] for `Retry-After` hints on 429 responses
//! - [`RetryPolicy`] for attempt limits and exponential backoff

use crate::error::ApiError;
use crate::logging::log_debug;

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

impl ApiError {
    /// Whether re-issuing the same request has a reasonable chance of succeeding.
    ///
    /// Transport failures, server faults and rate limits are retryable.
    /// Client errors need a different request, and redirects need a different
    /// URL, so neither is.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Server { .. } => true,
            ApiError::RateLimit { .. } => true,
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Client { .. } => false,
            ApiError::Redirect { .. } => false,
            ApiError::Validation { .. } => false,
        }
    }
}

/// Retry verdict for an arbitrary error.
///
/// Errors that are not an [`ApiError`] are never retryable.
pub fn is_retryable(error: &(dyn std::error::Error + 'static)) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_retryable)
}

/// Parse a `Retry-After` header value into a delay in milliseconds.
///
/// Accepts decimal seconds (`"120"`) or an HTTP-date in any of its three
/// forms: IMF-fixdate (`"Sun, 06 Nov 1994 08:49:37 GMT"`), RFC 850
/// (`"Sunday, 06-Nov-94 08:49:37 GMT"`) or asctime
/// (`"Sun Nov  6 08:49:37 1994"`). RFC 3339 timestamps are also accepted.
/// Returns `None` for a missing or unparsable value, and for a date that has
/// already passed.
pub fn parse_retry_delay(value: Option<&str>) -> Option<u64> {
    parse_retry_delay_at(value, Utc::now())
}

/// [`parse_retry_delay`] against an explicit clock.
pub fn parse_retry_delay_at(value: Option<&str>, now: DateTime<Utc>) -> Option<u64> {
    let value = value?.trim();

    if let Ok(seconds) = value.parse::<i64>() {
        return u64::try_from(seconds)
            .ok()
            .map(|seconds| seconds.saturating_mul(1000));
    }

    let date = parse_http_date(value)?;
    let delta_ms = (date - now).num_milliseconds();
    u64::try_from(delta_ms).ok().filter(|ms| *ms > 0)
}

const RFC_850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// RFC 850 and asctime dates carry no offset and are always UTC.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    [RFC_850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date| date.with_timezone(&Utc))
        })
}

/// Retry guidance for callers that drive their own retry loop.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add up to 10% random jitter to computed backoff delays
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Whether the caller should try again after `attempt` failed attempts.
    pub fn should_retry(&self, attempt: u32, error: &ApiError) -> bool {
        let retry = attempt < self.max_attempts && error.is_retryable();
        log_debug!(
            attempt = attempt,
            max_attempts = self.max_attempts,
            error_kind = ?error.kind(),
            retry = retry,
            "Evaluated retry policy"
        );
        retry
    }

    /// How long to wait before the next attempt.
    ///
    /// A server-provided rate-limit delay wins over computed backoff, capped
    /// at `max_delay`.
    pub fn delay_for(&self, attempt: u32, error: &ApiError) -> Duration {
        if let Some(ms) = error.retry_after_ms() {
            return Duration::from_millis(ms).min(self.max_delay);
        }
        self.backoff(attempt)
    }

    /// Exponential backoff for the given 1-based attempt, never above `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_seconds =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let mut delay = delay_seconds.min(self.max_delay.as_secs_f64()).max(0.0);

        if self.jitter {
            delay *= 1.0 + fastrand::f64() * 0.1;
        }

        Duration::try_from_secs_f64(delay)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
