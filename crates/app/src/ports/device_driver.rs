//! Device driver port: discover physical devices and read or set their power.
//!
//! The core only relies on the semantics of these three operations. The
//! transport (HTTP, a virtual in-memory device, …) lives in adapter crates.

use std::future::Future;
use std::time::Duration;

use sunswitch_domain::device::normalize_name;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::power::PowerState;

/// Reference to a device reported by the driver during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    /// Name as reported by the device.
    pub name: String,
    /// Driver-specific address (host, id, …).
    pub address: String,
}

impl DeviceHandle {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Case-insensitive lookup key, comparable with configured device names.
    #[must_use]
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Observed state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub state: PowerState,
    /// Brightness `0..=255`, when the device is dimmable.
    pub dim: Option<u8>,
}

impl DeviceStatus {
    #[must_use]
    pub fn new(state: PowerState) -> Self {
        Self { state, dim: None }
    }

    #[must_use]
    pub fn with_dim(mut self, dim: u8) -> Self {
        self.dim = Some(dim);
        self
    }
}

/// A command sent through [`DeviceDriver::set_state`].
///
/// Every field is optional: a fade only carries `dim` and `transition`, a
/// plain power command only carries `state`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetStateCommand {
    pub state: Option<PowerState>,
    /// Target brightness `0..=255`.
    pub dim: Option<u8>,
    pub transition: Option<Duration>,
}

impl SetStateCommand {
    /// Discrete on/off command.
    #[must_use]
    pub fn power(state: PowerState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Brightness ramp towards `state` (full brightness for on, zero for off).
    #[must_use]
    pub fn fade(state: PowerState, transition: Duration) -> Self {
        let dim = if state.is_on() { u8::MAX } else { 0 };
        Self {
            state: None,
            dim: Some(dim),
            transition: Some(transition),
        }
    }
}

/// Access to physical devices.
///
/// [`discover`](Self::discover) is called exactly once per run, before any
/// other method.
pub trait DeviceDriver {
    /// Find reachable devices within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Discovery`] when the device layer cannot be
    /// started at all. This aborts the run.
    fn discover(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<DeviceHandle>, SunswitchError>> + Send;

    /// Read the current state of a device, bypassing any cache when
    /// `force_refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Driver`] when the device cannot be reached.
    fn get_state(
        &self,
        device: &DeviceHandle,
        force_refresh: bool,
    ) -> impl Future<Output = Result<DeviceStatus, SunswitchError>> + Send;

    /// Apply `command` to a device.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Driver`] when the device cannot be reached.
    fn set_state(
        &self,
        device: &DeviceHandle,
        command: SetStateCommand,
    ) -> impl Future<Output = Result<(), SunswitchError>> + Send;
}
