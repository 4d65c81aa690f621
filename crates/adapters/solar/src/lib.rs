//! # sunswitch-adapter-solar
//!
//! [`SolarCalculator`] computed offline from latitude, longitude and date.

use chrono::NaiveDate;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use sunswitch_app::ports::{SolarCalculator, SunTimes};
use sunswitch_domain::error::SunswitchError;

/// Errors raised by the solar calculation.
#[derive(Debug, thiserror::Error)]
pub enum SolarError {
    #[error("coordinates ({latitude}, {longitude}) are out of range")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Polar day or night: the sun does not cross the horizon that day.
    #[error("no sunrise or sunset on {0}")]
    NoTransition(NaiveDate),
}

impl From<SolarError> for SunswitchError {
    fn from(err: SolarError) -> Self {
        Self::Solar(Box::new(err))
    }
}

/// Astronomical sunrise and sunset at sea level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunriseCalculator;

impl SunriseCalculator {
    fn compute(latitude: f64, longitude: f64, date: NaiveDate) -> Result<SunTimes, SolarError> {
        let coordinates = Coordinates::new(latitude, longitude)
            .ok_or(SolarError::InvalidCoordinates { latitude, longitude })?;
        let day = SolarDay::new(coordinates, date);
        let sunrise = day.event_time(SolarEvent::Sunrise);
        let sunset = day.event_time(SolarEvent::Sunset);
        if sunset <= sunrise {
            return Err(SolarError::NoTransition(date));
        }
        Ok(SunTimes { sunrise, sunset })
    }
}

impl SolarCalculator for SunriseCalculator {
    fn sun_times(&self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<SunTimes, SunswitchError> {
        Ok(Self::compute(latitude, longitude, date)?)
    }
}
