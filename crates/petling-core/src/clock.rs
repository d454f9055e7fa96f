//! Wall-clock helpers.
//!
//! The state machines take explicit `now_ms` arguments and never read the
//! clock themselves; only the outer glue (CLI, embedders) calls [`now_ms`].

use chrono::{DateTime, Utc};

pub const MS_PER_MINUTE: u64 = 60 * 1000;

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Convert epoch milliseconds into a UTC timestamp for event payloads.
pub fn to_utc(epoch_ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
