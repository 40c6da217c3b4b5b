use std::time::Duration;

use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};

use crate::api::rate_limit;
use crate::config::types::HttpSettings;

/// How the client should react to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    /// 404: the caller decides whether absence is an error.
    NotFound,
    /// 401, or 403 that is not a rate limit.
    Unauthorized,
    /// Transient failure; `wait_hint` is the server-requested delay, if any.
    Retry { wait_hint: Option<Duration> },
    /// Any other client error. Retrying would not help.
    Reject,
}

/// Classify a response by status and rate-limit headers.
pub fn classify(status: StatusCode, headers: &HeaderMap, now: DateTime<Utc>) -> Disposition {
    if status.is_success() {
        return Disposition::Success;
    }
    match status {
        StatusCode::NOT_FOUND => Disposition::NotFound,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => Disposition::Retry {
            wait_hint: rate_limit::server_wait(headers, now),
        },
        // Both services report an exhausted budget as 403; GitHub does the
        // same for secondary limits.
        StatusCode::FORBIDDEN
            if rate_limit::is_exhausted(headers) || headers.contains_key(http::header::RETRY_AFTER) =>
        {
            Disposition::Retry {
                wait_hint: rate_limit::server_wait(headers, now),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Disposition::Unauthorized,
        s if s.is_server_error() => Disposition::Retry {
            wait_hint: rate_limit::retry_after(headers, now),
        },
        _ => Disposition::Reject,
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Server-requested waits longer than this abort the run instead.
    pub max_server_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

impl RetryPolicy {
    pub fn from_settings(http: &HttpSettings) -> Self {
        Self {
            max_attempts: http.max_attempts.max(1),
            initial_backoff: Duration::from_millis(http.initial_backoff_ms),
            max_backoff: Duration::from_millis(http.max_backoff_ms),
            max_server_wait: Duration::from_secs(http.max_retry_wait_secs),
        }
    }

    /// Backoff after the given (1-based) failed attempt: doubles each time,
    /// capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1_u32 << exp)
            .min(self.max_backoff)
    }

    /// Delay before the next attempt. A server hint replaces the computed
    /// backoff; `None` means the hint is longer than we are willing to wait.
    pub fn delay(&self, attempt: u32, wait_hint: Option<Duration>) -> Option<Duration> {
        match wait_hint {
            Some(hint) if hint > self.max_server_wait => None,
            Some(hint) => Some(hint),
            None => Some(self.backoff(attempt)),
        }
    }
}

/// Transport errors worth another attempt: timeouts and connection trouble.
pub(crate) fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}
