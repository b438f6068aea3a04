// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting shared by the state file and the status line
//! (spec.md §4.8).

use chrono::{TimeZone, Utc};

/// Render epoch milliseconds as ISO-8601 with millisecond precision, the
/// format the state file persists `time`/`last` in.
pub fn epoch_ms_to_iso8601(epoch_ms: u64) -> String {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap())
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Parse an ISO-8601 millisecond timestamp back to epoch milliseconds.
/// Returns `None` on any malformed input, mirroring the original's
/// tolerant `Read` behavior of leaving state untouched on parse failure.
pub fn iso8601_to_epoch_ms(s: &str) -> Option<u64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis().max(0) as u64)
}

/// Seconds elapsed from `from_ms` to `now_ms`, or `None` if `now_ms` is
/// before `from_ms` (clock skew, or a `last` timestamp from the future) —
/// the original implementation's `Format` silently omits the elapsed-time
/// clause in that case rather than printing a negative count.
pub fn elapsed_seconds(from_ms: u64, now_ms: u64) -> Option<i64> {
    if now_ms < from_ms {
        return None;
    }
    Some(((now_ms - from_ms) / 1000) as i64)
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
