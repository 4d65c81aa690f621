//! Solar port: sunrise and sunset for a place and a calendar day.

use chrono::NaiveDate;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::time::Timestamp;

/// Sunrise and sunset of one day, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: Timestamp,
    pub sunset: Timestamp,
}

/// Astronomical calculator.
pub trait SolarCalculator {
    /// Compute the solar events of `date` at (`latitude`, `longitude`).
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Solar`] when no sunrise/sunset can be derived
    /// (invalid date, polar day or night).
    fn sun_times(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<SunTimes, SunswitchError>;
}
