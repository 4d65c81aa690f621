//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SunswitchError`] at port boundaries. Only [`SunswitchError::Config`] and
//! [`SunswitchError::Discovery`] abort a run; everything else is isolated to
//! the device or collaborator that produced it.

use crate::rule::BoundSide;

/// Boxed error source carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the sunswitch workspace.
#[derive(Debug, thiserror::Error)]
pub enum SunswitchError {
    /// The configuration document is invalid.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// A single device could not be queried or commanded.
    #[error("device `{device}` failed")]
    Driver {
        device: String,
        #[source]
        source: BoxError,
    },

    /// The device layer could not be started.
    #[error("device discovery failed")]
    Discovery(#[source] BoxError),

    /// Weather data could not be fetched or cached.
    #[error("weather fetch failed")]
    WeatherFetch(#[source] BoxError),

    /// The override ledger could not be read or written.
    #[error("override ledger error")]
    Ledger(#[source] BoxError),

    /// Sunrise/sunset could not be computed for the requested day.
    #[error("solar calculation failed")]
    Solar(#[source] BoxError),
}

impl SunswitchError {
    /// Build a [`Driver`](Self::Driver) error for `device`.
    pub fn driver(device: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Driver {
            device: device.into(),
            source: source.into(),
        }
    }

    /// Whether this error must abort the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Discovery(_))
    }
}

/// Validation errors raised while loading rules and locations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A rule has neither an exact, a sunrise nor a sunset source for one side.
    #[error("rule has no {0} time (expected `{0}`, `{0}Sunrise` or `{0}Sunset`)")]
    MissingBound(BoundSide),

    /// An exact time is not `H:MM` / `HH:MM`.
    #[error("invalid clock time `{0}` (expected HH:MM)")]
    InvalidClockTime(String),

    /// A weekday is not a digit between 0 (Monday) and 6 (Sunday).
    #[error("invalid weekday `{0}` (expected 0=Monday … 6=Sunday)")]
    InvalidWeekday(String),

    /// A sun offset or cloud adjustment exceeds one day.
    #[error("{side} offset of {minutes} minutes is out of range (at most ±{max})", max = crate::rule::MAX_OFFSET_MINUTES)]
    OffsetOutOfRange { side: BoundSide, minutes: i64 },

    /// A latitude or longitude is out of range.
    #[error("invalid coordinates ({lat}, {long})")]
    InvalidCoordinates { lat: String, long: String },
}
