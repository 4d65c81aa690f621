//! Virtual switch: plain on/off, ignores brightness.

use std::sync::Mutex;

use sunswitch_app::ports::{DeviceStatus, SetStateCommand};
use sunswitch_domain::power::PowerState;

/// A simulated switch that can be turned on and off.
pub struct VirtualSwitch {
    name: String,
    state: Mutex<PowerState>,
}

impl VirtualSwitch {
    #[must_use]
    pub fn new(name: impl Into<String>, state: PowerState) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(state),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::new(*self.lock_state())
    }

    pub fn apply(&self, command: SetStateCommand) -> DeviceStatus {
        let mut state = self.lock_state();
        if let Some(next) = command.state {
            *state = next;
        }
        DeviceStatus::new(*state)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PowerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
