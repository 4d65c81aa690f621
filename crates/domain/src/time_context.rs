//! Time context: the single "now" snapshot a run is evaluated against.
//!
//! A [`TimeContext`] is created once per run and never mutated. Every
//! instant it holds is local wall-clock time floored to the minute, so a
//! run started at `05:29:59` evaluates exactly like one started at `05:29:00`.

use chrono::{Duration, NaiveTime};

use crate::error::ConfigError;
use crate::location::CloudCover;
use crate::rule::parse_clock_time;
use crate::time::{LocalTime, floor_to_minute};
use crate::weekday::{WeekdaySet, date_weekday_index};

/// Evaluation instant plus the day's solar events and weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    now: LocalTime,
    sunrise: LocalTime,
    sunset: LocalTime,
    weekday: u8,
    cloud_cover: CloudCover,
}

impl TimeContext {
    /// Build a context from local instants. All instants are floored to the minute.
    #[must_use]
    pub fn new(
        now: LocalTime,
        sunrise: LocalTime,
        sunset: LocalTime,
        cloud_cover: CloudCover,
    ) -> Self {
        let now = floor_to_minute(now);
        Self {
            now,
            sunrise: floor_to_minute(sunrise),
            sunset: floor_to_minute(sunset),
            weekday: date_weekday_index(now.date()),
            cloud_cover,
        }
    }

    #[must_use]
    pub fn now(&self) -> LocalTime {
        self.now
    }

    #[must_use]
    pub fn sunrise(&self) -> LocalTime {
        self.sunrise
    }

    #[must_use]
    pub fn sunset(&self) -> LocalTime {
        self.sunset
    }

    /// Monday-based weekday index of `now` (0 = Monday, 6 = Sunday).
    #[must_use]
    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    #[must_use]
    pub fn cloud_cover(&self) -> CloudCover {
        self.cloud_cover
    }

    /// Saturday or Sunday.
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        self.weekday >= 5
    }

    #[must_use]
    pub fn is_day_of_week(&self, days: WeekdaySet) -> bool {
        days.contains_index(self.weekday)
    }

    /// Place a clock time on the same calendar day as `now`.
    #[must_use]
    pub fn exact_time(&self, time: NaiveTime) -> LocalTime {
        self.now.date().and_time(time)
    }

    /// Parse `H:MM` / `HH:MM` and place it on the same calendar day as `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidClockTime`] when `value` is not a valid time.
    pub fn parse_exact_time(&self, value: &str) -> Result<LocalTime, ConfigError> {
        parse_clock_time(value).map(|time| self.exact_time(time))
    }

    /// Sunrise shifted by `offset_minutes`, then cloud-adjusted.
    #[must_use]
    pub fn resolve_sunrise(&self, offset_minutes: i64, adjust_minutes: i64) -> LocalTime {
        self.adjust_for_clouds(shift(self.sunrise, offset_minutes.saturating_mul(60)), adjust_minutes)
    }

    /// Sunset shifted by `offset_minutes`, then cloud-adjusted.
    #[must_use]
    pub fn resolve_sunset(&self, offset_minutes: i64, adjust_minutes: i64) -> LocalTime {
        self.adjust_for_clouds(shift(self.sunset, offset_minutes.saturating_mul(60)), adjust_minutes)
    }

    /// Shift `instant` by `adjust_minutes` scaled by the cloud percentage.
    ///
    /// No-op when `adjust_minutes` is zero or cloud cover is outside `(0, 100]`.
    /// A negative adjustment moves the instant earlier.
    #[must_use]
    pub fn adjust_for_clouds(&self, instant: LocalTime, adjust_minutes: i64) -> LocalTime {
        let percent = i64::from(self.cloud_cover.percent());
        if adjust_minutes == 0 || percent == 0 || percent > 100 {
            return instant;
        }
        let seconds = adjust_minutes
            .checked_mul(60 * percent)
            .map_or(i64::MAX, |scaled| scaled / 100);
        shift(instant, seconds)
    }

    /// Half-open window check: `time_on <= now < time_off`.
    #[must_use]
    pub fn is_active(&self, time_on: LocalTime, time_off: LocalTime) -> bool {
        time_on <= self.now && self.now < time_off
    }
}

/// Move `instant` by `seconds`, saturating to `instant` when out of range.
fn shift(instant: LocalTime, seconds: i64) -> LocalTime {
    Duration::try_seconds(seconds)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(instant)
}
