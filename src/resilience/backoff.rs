//! Linear backoff with Retry-After override.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Delay before the retry that follows failed attempt `attempt` (1-based).
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Pick the wait before the next attempt.
///
/// A server-provided Retry-After wins over the linear schedule and is capped
/// at `cap`. The linear schedule itself is never capped.
pub fn next_delay(
    base: Duration,
    attempt: u32,
    retry_after: Option<Duration>,
    cap: Duration,
) -> Duration {
    match retry_after {
        Some(hint) => hint.min(cap),
        None => linear_backoff(base, attempt),
    }
}

/// Read a Retry-After header (delta-seconds or HTTP-date).
///
/// Dates in the past yield zero. Unparseable values are ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    parse_retry_after(raw, Utc::now())
}

fn parse_retry_after(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    Some(date.signed_duration_since(now).to_std().unwrap_or(Duration::ZERO))
}
