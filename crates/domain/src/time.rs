//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// UTC timestamp used for ledger entries and evaluation instants.
pub type Timestamp = DateTime<Utc>;

/// Local wall-clock instant in the controller's timezone.
///
/// Rule windows are compared in wall-clock time, so an exact `"18:00"`
/// always means six in the evening where the devices are.
pub type LocalTime = NaiveDateTime;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Drop seconds and sub-second precision.
#[must_use]
pub fn floor_to_minute(instant: LocalTime) -> LocalTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}
