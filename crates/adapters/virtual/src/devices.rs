//! Virtual device implementations: light and switch.

mod light;
mod switch;

pub use light::VirtualLight;
pub use switch::VirtualSwitch;

use sunswitch_app::ports::{DeviceStatus, SetStateCommand};
use sunswitch_domain::device::DeviceKind;

/// Wrapper enum for the concrete virtual device types.
pub enum VirtualDevice {
    Light(VirtualLight),
    Switch(VirtualSwitch),
}

impl VirtualDevice {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Light(d) => d.name(),
            Self::Switch(d) => d.name(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Light(_) => DeviceKind::Light,
            Self::Switch(_) => DeviceKind::Switch,
        }
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::Light(d) => d.status(),
            Self::Switch(d) => d.status(),
        }
    }

    /// Apply a command, returning the resulting status.
    pub fn apply(&self, command: SetStateCommand) -> DeviceStatus {
        match self {
            Self::Light(d) => d.apply(command),
            Self::Switch(d) => d.apply(command),
        }
    }
}
