//! Creation timestamps
//!
//! Writers are serialized by the engine, so a timestamp that never goes
//! backwards within the process is also non-decreasing in commit order.
//! The wall clock alone does not give that: it can be stepped back.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ISSUED_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time, strictly later than any value previously returned
///
/// Follows the wall clock while it moves forward; otherwise advances by
/// one nanosecond past the last issued value.
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    let next = |last: i64| wall.max(last.saturating_add(1));

    let previous = LAST_ISSUED_NANOS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next(last)))
        .unwrap_or_else(|last| last);

    DateTime::from_timestamp_nanos(next(previous))
}
