//! Time context factory: turns "now" and a location into a [`TimeContext`].

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::location::{CloudCover, Location};
use sunswitch_domain::time::Timestamp;
use sunswitch_domain::time_context::TimeContext;

use crate::ports::SolarCalculator;

fn to_local(timezone: Tz, instant: Timestamp) -> NaiveDateTime {
    timezone.from_utc_datetime(&instant.naive_utc()).naive_local()
}

/// Build the context of a run started at `now`.
///
/// Sunrise and sunset are those of the *local* calendar day containing
/// `now`, which may differ from the UTC day close to midnight.
///
/// # Errors
///
/// Returns [`SunswitchError::Solar`] when the solar calculator cannot
/// produce the day's events.
#[tracing::instrument(skip(location, solar), fields(tz = %location.timezone))]
pub fn create(
    location: &Location,
    solar: &impl SolarCalculator,
    cloud_cover: CloudCover,
    now: Timestamp,
) -> Result<TimeContext, SunswitchError> {
    let local_now = to_local(location.timezone, now);
    let sun = solar.sun_times(location.latitude, location.longitude, local_now.date())?;
    let ctx = TimeContext::new(
        local_now,
        to_local(location.timezone, sun.sunrise),
        to_local(location.timezone, sun.sunset),
        cloud_cover,
    );
    tracing::debug!(
        now = %ctx.now(),
        sunrise = %ctx.sunrise(),
        sunset = %ctx.sunset(),
        weekday = ctx.weekday(),
        cloud_cover = %ctx.cloud_cover(),
        "time context created"
    );
    Ok(ctx)
}
