//! Tasmota console commands used by the driver.

use std::fmt;
use std::time::Duration;

use sunswitch_domain::power::PowerState;

/// Fade speed unit: one step is half a second.
const SPEED_STEP_MS: u128 = 500;
const SPEED_MIN: u8 = 1;
const SPEED_MAX: u8 = 40;

/// A command sent through `/cm?cmnd=<command>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasmotaCommand {
    /// Device status, including its name.
    Status,
    /// Query the power state.
    PowerQuery,
    /// Set the power state.
    Power(PowerState),
    /// Enable fading and ramp the dimmer to `percent` over `speed` half-seconds.
    FadeTo { speed: u8, percent: u8 },
}

impl TasmotaCommand {
    /// Ramp towards a `0..=255` brightness over `transition`.
    #[must_use]
    pub fn fade(dim: u8, transition: Duration) -> Self {
        Self::FadeTo {
            speed: transition_to_speed(transition),
            percent: dim_to_percent(dim),
        }
    }
}

impl fmt::Display for TasmotaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => f.write_str("Status"),
            Self::PowerQuery => f.write_str("Power"),
            Self::Power(state) => write!(f, "Power {state}"),
            Self::FadeTo { speed, percent } => {
                write!(f, "Backlog Fade 1; Speed {speed}; Dimmer {percent}")
            }
        }
    }
}

/// Map a `0..=255` brightness to Tasmota's `0..=100` dimmer.
#[must_use]
pub fn dim_to_percent(dim: u8) -> u8 {
    let percent = (u32::from(dim) * 100 + 127) / 255;
    u8::try_from(percent).unwrap_or(100)
}

/// Map a duration to Tasmota fade speed, in half-second steps within `1..=40`.
#[must_use]
pub fn transition_to_speed(transition: Duration) -> u8 {
    let steps = transition.as_millis().div_ceil(SPEED_STEP_MS);
    u8::try_from(steps).unwrap_or(SPEED_MAX).clamp(SPEED_MIN, SPEED_MAX)
}
