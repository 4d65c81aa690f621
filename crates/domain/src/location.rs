//! Location: where the controller runs, and the weather it observes there.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Geographic position and timezone of the controlled installation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub timezone: Tz,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Create a location after checking the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCoordinates`] when the latitude is not in
    /// `-90..=90` or the longitude is not in `-180..=180`.
    pub fn new(timezone: Tz, latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ConfigError::InvalidCoordinates {
                lat: latitude.to_string(),
                long: longitude.to_string(),
            });
        }
        Ok(Self {
            timezone,
            latitude,
            longitude,
        })
    }
}

/// Cloud cover percentage, `0..=100`.
///
/// Zero doubles as "unknown": every cloud adjustment is a no-op at 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloudCover(u8);

impl CloudCover {
    /// No cloud data available.
    pub const UNKNOWN: Self = Self(0);

    /// Wrap a percentage, returning `None` when it exceeds 100.
    #[must_use]
    pub fn from_percent(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    /// Convert a `0.0..=1.0` fraction (as reported by most weather APIs).
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (fraction * 100.0).round() as u8;
        Self::from_percent(percent)
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for CloudCover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
