//! In-memory port implementations shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::ledger::OverrideLedger;
use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::Timestamp;

use crate::ports::{
    ChangeLog, DeviceDriver, DeviceHandle, DeviceStatus, LedgerStore, SetStateCommand,
    SolarCalculator, SunTimes,
};

// ── Device driver ───────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeDriver {
    handles: Vec<DeviceHandle>,
    states: Mutex<HashMap<String, DeviceStatus>>,
    unreachable: HashSet<String>,
    fail_discovery: bool,
    pub(crate) commands: Mutex<Vec<(String, SetStateCommand)>>,
    pub(crate) discovered_with: Mutex<Option<Duration>>,
}

impl FakeDriver {
    pub(crate) fn with_device(mut self, name: &str, state: PowerState) -> Self {
        let handle = DeviceHandle::new(name, format!("fake://{name}"));
        self.states
            .get_mut()
            .unwrap()
            .insert(handle.address.clone(), DeviceStatus::new(state));
        self.handles.push(handle);
        self
    }

    pub(crate) fn with_unreachable(mut self, name: &str) -> Self {
        let handle = DeviceHandle::new(name, format!("fake://{name}"));
        self.unreachable.insert(handle.address.clone());
        self.handles.push(handle);
        self
    }

    pub(crate) fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub(crate) fn handle(&self, name: &str) -> DeviceHandle {
        self.handles
            .iter()
            .find(|h| h.name == name)
            .cloned()
            .unwrap()
    }

    pub(crate) fn set(&self, name: &str, state: PowerState) {
        self.states
            .lock()
            .unwrap()
            .insert(format!("fake://{name}"), DeviceStatus::new(state));
    }

    pub(crate) fn state(&self, name: &str) -> PowerState {
        self.states.lock().unwrap()[&format!("fake://{name}")].state
    }

    pub(crate) fn commands(&self) -> Vec<(String, SetStateCommand)> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }
}

impl DeviceDriver for FakeDriver {
    async fn discover(&mut self, timeout: Duration) -> Result<Vec<DeviceHandle>, SunswitchError> {
        *self.discovered_with.lock().unwrap() = Some(timeout);
        if self.fail_discovery {
            return Err(SunswitchError::Discovery("bridge not found".into()));
        }
        Ok(self.handles.clone())
    }

    async fn get_state(
        &self,
        device: &DeviceHandle,
        _force_refresh: bool,
    ) -> Result<DeviceStatus, SunswitchError> {
        if self.unreachable.contains(&device.address) {
            return Err(SunswitchError::driver(&device.name, "timed out"));
        }
        Ok(self.states.lock().unwrap()[&device.address])
    }

    async fn set_state(
        &self,
        device: &DeviceHandle,
        command: SetStateCommand,
    ) -> Result<(), SunswitchError> {
        if self.unreachable.contains(&device.address) {
            return Err(SunswitchError::driver(&device.name, "timed out"));
        }
        let mut states = self.states.lock().unwrap();
        let status = states.get_mut(&device.address).unwrap();
        if let Some(state) = command.state {
            status.state = state;
        }
        if let Some(dim) = command.dim {
            status.dim = Some(dim);
        }
        self.commands
            .lock()
            .unwrap()
            .push((device.name.clone(), command));
        Ok(())
    }
}

// ── Change log ──────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct RecordingChangeLog {
    pub(crate) entries: Mutex<Vec<String>>,
}

impl RecordingChangeLog {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ChangeLog for RecordingChangeLog {
    fn record(&self, device: &str, state: PowerState, _at: Timestamp) {
        self.entries
            .lock()
            .unwrap()
            .push(format!("{device} -> {state}"));
    }
}

// ── Ledger store ────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryLedgerStore {
    saved: Mutex<Option<OverrideLedger>>,
    saves: Mutex<u32>,
    fail_load: bool,
}

impl InMemoryLedgerStore {
    pub(crate) fn with(ledger: OverrideLedger) -> Self {
        Self {
            saved: Mutex::new(Some(ledger)),
            ..Self::default()
        }
    }

    /// A store whose ledger cannot be read.
    pub(crate) fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub(crate) fn current(&self) -> OverrideLedger {
        self.saved.lock().unwrap().clone().unwrap_or_default()
    }

    pub(crate) fn saves(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<OverrideLedger, SunswitchError> {
        if self.fail_load {
            return Err(SunswitchError::Ledger("corrupted".into()));
        }
        Ok(self.current())
    }

    fn save(&self, ledger: &OverrideLedger) -> Result<(), SunswitchError> {
        *self.saved.lock().unwrap() = Some(ledger.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

// ── Solar ───────────────────────────────────────────────────────────

/// Sunrise at 07:00 and sunset at 19:00 UTC, every day.
pub(crate) struct FixedSolar;

impl SolarCalculator for FixedSolar {
    fn sun_times(&self, _lat: f64, _long: f64, date: NaiveDate) -> Result<SunTimes, SunswitchError> {
        Ok(SunTimes {
            sunrise: date.and_hms_opt(7, 0, 0).unwrap().and_utc(),
            sunset: date.and_hms_opt(19, 0, 0).unwrap().and_utc(),
        })
    }
}
