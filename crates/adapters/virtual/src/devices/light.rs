//! Virtual light: power plus a `0..=255` brightness level.

use std::sync::Mutex;

use sunswitch_app::ports::{DeviceStatus, SetStateCommand};
use sunswitch_domain::power::PowerState;

/// A simulated dimmable light.
pub struct VirtualLight {
    name: String,
    status: Mutex<DeviceStatus>,
}

impl VirtualLight {
    #[must_use]
    pub fn new(name: impl Into<String>, state: PowerState) -> Self {
        let dim = if state.is_on() { u8::MAX } else { 0 };
        Self {
            name: name.into(),
            status: Mutex::new(DeviceStatus::new(state).with_dim(dim)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        *self.lock_status()
    }

    /// Apply the power and brightness parts of `command`.
    ///
    /// Transitions are instantaneous: the target brightness is reached at once.
    pub fn apply(&self, command: SetStateCommand) -> DeviceStatus {
        let mut status = self.lock_status();
        if let Some(dim) = command.dim {
            status.dim = Some(dim);
        }
        if let Some(state) = command.state {
            status.state = state;
        }
        *status
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, DeviceStatus> {
        self.status
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
