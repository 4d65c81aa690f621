//! Driver selection: the configured [`DeviceDriver`] behind one type.

use std::time::Duration;

use sunswitch_adapter_tasmota_http::TasmotaDriver;
use sunswitch_adapter_virtual::VirtualDriver;
use sunswitch_app::ports::{DeviceDriver, DeviceHandle, DeviceStatus, SetStateCommand};
use sunswitch_domain::error::SunswitchError;

use crate::config::{Config, DriverKind};

pub enum Driver {
    Tasmota(TasmotaDriver),
    Virtual(VirtualDriver),
}

impl Driver {
    /// Build the driver selected in `config`.
    ///
    /// The virtual driver exposes every configured device, initially off.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Discovery`] if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, SunswitchError> {
        match config.driver.kind {
            DriverKind::Tasmota => TasmotaDriver::new(config.driver.hosts.iter().cloned())
                .map(Self::Tasmota)
                .map_err(|err| SunswitchError::Discovery(Box::new(err))),
            DriverKind::Virtual => {
                let driver = config
                    .device_specs()
                    .into_iter()
                    .fold(VirtualDriver::new(), |driver, spec| {
                        driver.with_device(spec.name, spec.kind)
                    });
                Ok(Self::Virtual(driver))
            }
        }
    }
}

impl DeviceDriver for Driver {
    async fn discover(&mut self, timeout: Duration) -> Result<Vec<DeviceHandle>, SunswitchError> {
        match self {
            Self::Tasmota(driver) => driver.discover(timeout).await,
            Self::Virtual(driver) => driver.discover(timeout).await,
        }
    }

    async fn get_state(
        &self,
        device: &DeviceHandle,
        force_refresh: bool,
    ) -> Result<DeviceStatus, SunswitchError> {
        match self {
            Self::Tasmota(driver) => driver.get_state(device, force_refresh).await,
            Self::Virtual(driver) => driver.get_state(device, force_refresh).await,
        }
    }

    async fn set_state(
        &self,
        device: &DeviceHandle,
        command: SetStateCommand,
    ) -> Result<(), SunswitchError> {
        match self {
            Self::Tasmota(driver) => driver.set_state(device, command).await,
            Self::Virtual(driver) => driver.set_state(device, command).await,
        }
    }
}
