//! Rate-limit signals and request pacing.
//!
//! Servers ask clients to back off through:
//! - `Retry-After` (delay in seconds, or an HTTP date) on 429/503
//! - GitHub's primary limit: 403/429 with `x-ratelimit-remaining: 0` and the
//!   reset time in `x-ratelimit-reset` (epoch seconds)
//! - ZenHub's limit: 403 with `x-ratelimit-used` at `x-ratelimit-limit` and
//!   the same `x-ratelimit-reset`

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::RETRY_AFTER;
use tokio::time::Instant;

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATELIMIT_USED: &str = "x-ratelimit-used";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

/// Parse `Retry-After` as either delta-seconds or an HTTP date.
pub(crate) fn retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = header_str(headers, RETRY_AFTER.as_str())?;
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name)?.parse().ok()
}

/// Whether the response says the rate-limit budget is spent, either as no
/// requests remaining or as the used count reaching the limit.
pub(crate) fn is_exhausted(headers: &HeaderMap) -> bool {
    if header_u64(headers, RATELIMIT_REMAINING) == Some(0) {
        return true;
    }
    match (
        header_u64(headers, RATELIMIT_USED),
        header_u64(headers, RATELIMIT_LIMIT),
    ) {
        (Some(used), Some(limit)) => used >= limit,
        _ => false,
    }
}

/// Time until `x-ratelimit-reset`, if the header is present.
pub(crate) fn until_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let epoch = header_str(headers, RATELIMIT_RESET)?.parse::<i64>().ok()?;
    let at = DateTime::<Utc>::from_timestamp(epoch, 0)?;
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

/// The wait the server asked for, preferring `Retry-After` over the reset
/// time of an exhausted budget.
pub(crate) fn server_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    retry_after(headers, now).or_else(|| {
        if is_exhausted(headers) {
            until_reset(headers, now)
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Spaces requests evenly to stay under a per-minute budget.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    /// `None` when `requests_per_minute` is zero (pacing disabled).
    pub fn per_minute(requests_per_minute: u32) -> Option<Self> {
        (requests_per_minute > 0).then(|| Self {
            interval: Duration::from_secs(60) / requests_per_minute,
            next_slot: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request slot is free and reserve it.
    pub async fn wait(&self) {
        let delay = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = next.map_or(now, |t| t.max(now));
            *next = Some(slot + self.interval);
            slot - now
        };
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis(), "pacing request");
            tokio::time::sleep(delay).await;
        }
    }
}
