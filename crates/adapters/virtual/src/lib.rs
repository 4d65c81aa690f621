//! # sunswitch-adapter-virtual
//!
//! Virtual device driver providing simulated lights and switches.
//!
//! Devices hold their state in memory and every command sent to them is
//! recorded, which makes this driver suitable for dry runs, demos and
//! end-to-end tests.
//!
//! ## Dependency rule
//!
//! Depends on `sunswitch-app` (port traits) and `sunswitch-domain` only.

mod devices;

use std::sync::Mutex;
use std::time::Duration;

use sunswitch_app::ports::{DeviceDriver, DeviceHandle, DeviceStatus, SetStateCommand};
use sunswitch_domain::device::{DeviceKind, normalize_name};
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::power::PowerState;

pub use devices::{VirtualDevice, VirtualLight, VirtualSwitch};

const ADDRESS_PREFIX: &str = "virtual://";

/// Errors raised by the virtual driver.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("no virtual device at `{0}`")]
    UnknownDevice(String),
    #[error("virtual device is unreachable")]
    Unreachable,
}

/// A command received by a virtual device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub device: String,
    pub command: SetStateCommand,
}

/// In-memory [`DeviceDriver`].
#[derive(Default)]
pub struct VirtualDriver {
    devices: Vec<VirtualDevice>,
    unreachable: Mutex<Vec<String>>,
    commands: Mutex<Vec<RecordedCommand>>,
}

impl VirtualDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_light(mut self, name: impl Into<String>, state: PowerState) -> Self {
        self.devices
            .push(VirtualDevice::Light(VirtualLight::new(name, state)));
        self
    }

    #[must_use]
    pub fn with_switch(mut self, name: impl Into<String>, state: PowerState) -> Self {
        self.devices
            .push(VirtualDevice::Switch(VirtualSwitch::new(name, state)));
        self
    }

    /// Add a device of `kind`, initially off.
    #[must_use]
    pub fn with_device(self, name: impl Into<String>, kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Light => self.with_light(name, PowerState::Off),
            DeviceKind::Switch => self.with_switch(name, PowerState::Off),
        }
    }

    /// Simulate someone operating the device by hand. Not recorded.
    ///
    /// Returns `false` when no device has that name.
    pub fn operate(&self, name: &str, state: PowerState) -> bool {
        self.find_by_name(name)
            .map(|device| device.apply(SetStateCommand::power(state)))
            .is_some()
    }

    /// Make a device fail every query and command, or reachable again.
    pub fn set_unreachable(&self, name: &str, unreachable: bool) {
        let key = normalize_name(name);
        let mut list = self
            .unreachable
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        list.retain(|entry| entry != &key);
        if unreachable {
            list.push(key);
        }
    }

    #[must_use]
    pub fn status(&self, name: &str) -> Option<DeviceStatus> {
        self.find_by_name(name).map(VirtualDevice::status)
    }

    /// Every command received so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn find_by_name(&self, name: &str) -> Option<&VirtualDevice> {
        let key = normalize_name(name);
        self.devices
            .iter()
            .find(|device| normalize_name(device.name()) == key)
    }

    fn resolve(&self, handle: &DeviceHandle) -> Result<&VirtualDevice, SunswitchError> {
        let unknown =
            || SunswitchError::driver(&handle.name, VirtualError::UnknownDevice(handle.address.clone()));
        let key = handle.address.strip_prefix(ADDRESS_PREFIX).ok_or_else(unknown)?;
        let is_unreachable = self
            .unreachable
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .any(|entry| entry == key);
        if is_unreachable {
            return Err(SunswitchError::driver(&handle.name, VirtualError::Unreachable));
        }
        self.find_by_name(key).ok_or_else(unknown)
    }
}

impl DeviceDriver for VirtualDriver {
    async fn discover(&mut self, _timeout: Duration) -> Result<Vec<DeviceHandle>, SunswitchError> {
        let handles: Vec<DeviceHandle> = self
            .devices
            .iter()
            .map(|device| {
                DeviceHandle::new(
                    device.name(),
                    format!("{ADDRESS_PREFIX}{}", normalize_name(device.name())),
                )
            })
            .collect();
        tracing::info!(count = handles.len(), "virtual devices discovered");
        Ok(handles)
    }

    async fn get_state(
        &self,
        device: &DeviceHandle,
        _force_refresh: bool,
    ) -> Result<DeviceStatus, SunswitchError> {
        self.resolve(device).map(VirtualDevice::status)
    }

    async fn set_state(
        &self,
        device: &DeviceHandle,
        command: SetStateCommand,
    ) -> Result<(), SunswitchError> {
        let target = self.resolve(device)?;
        let status = target.apply(command);
        tracing::debug!(
            device = %device.name,
            kind = %target.kind(),
            state = %status.state,
            "virtual device updated"
        );
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(RecordedCommand {
                device: device.name.clone(),
                command,
            });
        Ok(())
    }
}
