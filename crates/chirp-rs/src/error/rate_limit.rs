//! Rate-limit snapshot parsed from API response headers.
//!
//! Every response (successful or not) carries the limit, remaining quota,
//! and reset time for the endpoint that produced it. The snapshot is
//! best-effort: missing or unparseable headers leave the field as `None`.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Limit, remaining quota, and reset time reported for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed in the current window.
    pub limit: Option<u32>,
    /// Requests left in the current window.
    pub remaining: Option<u32>,
    /// When the window resets.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimit {
    /// Parse a snapshot from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_header(headers, LIMIT_HEADER),
            remaining: parse_header(headers, REMAINING_HEADER),
            reset_at: parse_header::<i64>(headers, RESET_HEADER)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }

    /// Seconds until the window resets, clamped at zero.
    pub fn reset_in(&self) -> Option<u64> {
        self.reset_in_from(Utc::now())
    }

    fn reset_in_from(&self, now: DateTime<Utc>) -> Option<u64> {
        self.reset_at
            .map(|at| (at - now).num_seconds().max(0) as u64)
    }

    /// Whether no header contributed to this snapshot.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset_at.is_none()
    }
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
