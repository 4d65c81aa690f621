//! Rule bounds: where an on or off instant comes from.

use chrono::NaiveTime;

use crate::error::ConfigError;
use crate::time::LocalTime;
use crate::time_context::TimeContext;

/// Largest sun offset or cloud adjustment accepted, in minutes.
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60;

/// Which edge of a window a bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    On,
    Off,
}

impl std::fmt::Display for BoundSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Source of a window edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    /// Fixed clock time on the evaluation day.
    Exact(NaiveTime),
    /// Sunrise shifted by a number of minutes.
    Sunrise { offset_minutes: i64 },
    /// Sunset shifted by a number of minutes.
    Sunset { offset_minutes: i64 },
}

/// A window edge plus its optional cloud adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleBound {
    pub source: TimeBound,
    /// Minutes to shift the edge at 100% cloud cover, scaled linearly.
    pub adjust_clouds_minutes: i64,
}

impl RuleBound {
    #[must_use]
    pub fn exact(time: NaiveTime) -> Self {
        Self::from(TimeBound::Exact(time))
    }

    #[must_use]
    pub fn sunrise(offset_minutes: i64) -> Self {
        Self::from(TimeBound::Sunrise { offset_minutes })
    }

    #[must_use]
    pub fn sunset(offset_minutes: i64) -> Self {
        Self::from(TimeBound::Sunset { offset_minutes })
    }

    #[must_use]
    pub fn with_cloud_adjustment(mut self, minutes: i64) -> Self {
        self.adjust_clouds_minutes = minutes;
        self
    }

    /// Pick the source for one side: exact, then sunrise, then sunset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBound`] when no source is given and
    /// [`ConfigError::InvalidClockTime`] when the exact time is malformed.
    /// Offsets and cloud adjustments beyond [`MAX_OFFSET_MINUTES`] are
    /// [`ConfigError::OffsetOutOfRange`].
    pub fn from_options(
        side: BoundSide,
        exact: Option<&str>,
        sunrise: Option<i64>,
        sunset: Option<i64>,
        adjust_clouds: Option<i64>,
    ) -> Result<Self, ConfigError> {
        let source = match (exact, sunrise, sunset) {
            (Some(text), _, _) => TimeBound::Exact(parse_clock_time(text)?),
            (None, Some(offset_minutes), _) => TimeBound::Sunrise { offset_minutes },
            (None, None, Some(offset_minutes)) => TimeBound::Sunset { offset_minutes },
            (None, None, None) => return Err(ConfigError::MissingBound(side)),
        };
        let adjust_clouds_minutes = adjust_clouds.unwrap_or(0);
        let offset = match source {
            TimeBound::Exact(_) => 0,
            TimeBound::Sunrise { offset_minutes } | TimeBound::Sunset { offset_minutes } => {
                offset_minutes
            }
        };
        for minutes in [offset, adjust_clouds_minutes] {
            if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
                return Err(ConfigError::OffsetOutOfRange { side, minutes });
            }
        }
        Ok(Self {
            source,
            adjust_clouds_minutes,
        })
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self.source, TimeBound::Exact(_))
    }

    /// Concrete local instant for this edge.
    ///
    /// Exact times ignore the cloud adjustment.
    #[must_use]
    pub fn resolve(&self, ctx: &TimeContext) -> LocalTime {
        match self.source {
            TimeBound::Exact(time) => ctx.exact_time(time),
            TimeBound::Sunrise { offset_minutes } => {
                ctx.resolve_sunrise(offset_minutes, self.adjust_clouds_minutes)
            }
            TimeBound::Sunset { offset_minutes } => {
                ctx.resolve_sunset(offset_minutes, self.adjust_clouds_minutes)
            }
        }
    }
}

impl From<TimeBound> for RuleBound {
    fn from(source: TimeBound) -> Self {
        Self {
            source,
            adjust_clouds_minutes: 0,
        }
    }
}

/// Parse a 24-hour `H:MM` or `HH:MM` clock time.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidClockTime`] for anything else.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, ConfigError> {
    let invalid = || ConfigError::InvalidClockTime(value.to_string());
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

impl std::fmt::Display for TimeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (name, offset) = match self {
            Self::Exact(time) => return write!(f, "{}", time.format("%H:%M")),
            Self::Sunrise { offset_minutes } => ("sunrise", *offset_minutes),
            Self::Sunset { offset_minutes } => ("sunset", *offset_minutes),
        };
        match offset {
            0 => f.write_str(name),
            o if o > 0 => write!(f, "{name}+{o}m"),
            o => write!(f, "{name}{o}m"),
        }
    }
}

impl std::fmt::Display for RuleBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)?;
        if self.adjust_clouds_minutes != 0 && !self.is_exact() {
            write!(f, " (clouds {:+}m)", self.adjust_clouds_minutes)?;
        }
        Ok(())
    }
}
