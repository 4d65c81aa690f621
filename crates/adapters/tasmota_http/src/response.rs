//! Tasmota JSON responses.

use serde::Deserialize;
use sunswitch_domain::power::PowerState;

use crate::error::TasmotaError;

/// Answer to `Power` / `Power ON|OFF`: `{"POWER":"ON"}`.
#[derive(Debug, Deserialize)]
pub struct PowerResponse {
    #[serde(rename = "POWER", alias = "POWER1")]
    power: String,
}

impl PowerResponse {
    /// # Errors
    ///
    /// Returns [`TasmotaError::UnexpectedResponse`] when the value is neither `ON` nor `OFF`.
    pub fn state(&self) -> Result<PowerState, TasmotaError> {
        match self.power.as_str() {
            "ON" | "1" => Ok(PowerState::On),
            "OFF" | "0" => Ok(PowerState::Off),
            other => Err(TasmotaError::UnexpectedResponse(other.to_string())),
        }
    }
}

/// Answer to `Status`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "Status")]
    status: StatusBody,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(rename = "DeviceName")]
    device_name: Option<String>,
    #[serde(rename = "FriendlyName", default)]
    friendly_name: Vec<String>,
}

impl StatusResponse {
    /// Device name, falling back to the first friendly name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.status
            .device_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.status.friendly_name.first().map(String::as_str))
    }
}
