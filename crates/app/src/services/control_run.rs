//! Control run: one batch pass over every configured device.
//!
//! A run loads the override ledger, builds the time context, evaluates every
//! device, discovers the physical devices, reconciles each one and finally
//! saves the ledger once. Only ledger, solar and discovery failures abort a
//! run; a device that cannot be reached is logged and skipped.

use std::collections::HashMap;
use std::time::Duration;

use sunswitch_domain::device::{DeviceKind, DeviceSpec};
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::location::{CloudCover, Location};
use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::{LocalTime, Timestamp};

use crate::ports::{ChangeLog, DeviceDriver, DeviceHandle, LedgerStore, SolarCalculator};
use crate::services::override_tracker::OverrideTracker;
use crate::services::reconciler::{FadeSettings, ReconcileOutcome, Reconciler};
use crate::services::time_context;

/// Default time given to the driver to find devices.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one device within a run.
#[derive(Debug)]
pub enum DeviceResult {
    Reconciled(ReconcileOutcome),
    /// Configured but not reported by the driver.
    Missing,
    /// Could not be queried or commanded.
    Failed(SunswitchError),
}

impl std::fmt::Display for DeviceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reconciled(outcome) => outcome.fmt(f),
            Self::Missing => f.write_str("not found"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[derive(Debug)]
pub struct DeviceReport {
    pub name: String,
    pub kind: DeviceKind,
    pub expected: PowerState,
    pub result: DeviceResult,
}

/// Summary of a run.
#[derive(Debug)]
pub struct RunReport {
    /// Local evaluation instant, floored to the minute.
    pub evaluated_at: LocalTime,
    pub devices: Vec<DeviceReport>,
    /// `false` in dry-run mode.
    pub ledger_saved: bool,
}

impl RunReport {
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&DeviceReport> {
        let name = name.to_lowercase();
        self.devices.iter().find(|report| report.name == name)
    }

    /// Number of devices a command was sent to.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.devices
            .iter()
            .filter(|report| matches!(report.result, DeviceResult::Reconciled(ReconcileOutcome::Changed(_))))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.devices
            .iter()
            .filter(|report| matches!(report.result, DeviceResult::Failed(_) | DeviceResult::Missing))
            .count()
    }
}

/// Application service wiring every port of a run together.
pub struct ControlRun<D, L, S, P> {
    location: Location,
    devices: Vec<DeviceSpec>,
    driver: D,
    change_log: L,
    ledger: S,
    solar: P,
    discovery_timeout: Duration,
    fade: FadeSettings,
    dry_run: bool,
}

impl<D, L, S, P> ControlRun<D, L, S, P>
where
    D: DeviceDriver,
    L: ChangeLog,
    S: LedgerStore,
    P: SolarCalculator,
{
    pub fn new(
        location: Location,
        devices: Vec<DeviceSpec>,
        driver: D,
        change_log: L,
        ledger: S,
        solar: P,
    ) -> Self {
        Self {
            location,
            devices,
            driver,
            change_log,
            ledger,
            solar,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            fade: FadeSettings::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_fade(mut self, fade: FadeSettings) -> Self {
        self.fade = fade;
        self
    }

    /// Evaluate and report only: no command is sent and the ledger is not written.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Execute one run at `now` with the given cloud cover.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Ledger`] when the ledger cannot be loaded or
    /// saved, [`SunswitchError::Solar`] when the day's solar events are
    /// unavailable and [`SunswitchError::Discovery`] when the device layer
    /// cannot start. The ledger is never written when discovery fails.
    #[tracing::instrument(skip(self), fields(dry_run = self.dry_run))]
    pub async fn execute(
        &mut self,
        now: Timestamp,
        cloud_cover: CloudCover,
    ) -> Result<RunReport, SunswitchError> {
        let mut tracker = OverrideTracker::load(&self.ledger)?;
        let ctx = time_context::create(&self.location, &self.solar, cloud_cover, now)?;

        let devices: Vec<_> = self.devices.iter().map(|spec| spec.build(&ctx)).collect();
        for device in &devices {
            tracing::info!(%device, "evaluated");
            for rule in &device.rules {
                tracing::debug!(device = %device.name, %rule, "rule");
            }
        }

        let handles: HashMap<String, DeviceHandle> = self
            .driver
            .discover(self.discovery_timeout)
            .await?
            .into_iter()
            .map(|handle| (handle.key(), handle))
            .collect();
        tracing::debug!(count = handles.len(), "devices discovered");

        let reconciler = Reconciler::new(&self.driver, &self.change_log)
            .with_fade(self.fade)
            .with_dry_run(self.dry_run);

        let mut reports = Vec::with_capacity(devices.len());
        for device in devices {
            let result = match handles.get(&device.name) {
                None => {
                    tracing::warn!(device = %device.name, "device not found, skipping");
                    DeviceResult::Missing
                }
                Some(handle) => {
                    match reconciler.reconcile(&device, handle, &mut tracker, now).await {
                        Ok(outcome) => DeviceResult::Reconciled(outcome),
                        Err(err) => {
                            tracing::warn!(device = %device.name, error = ?err, "unable to reconcile device");
                            DeviceResult::Failed(err)
                        }
                    }
                }
            };
            reports.push(DeviceReport {
                expected: device.expected_state(),
                name: device.name,
                kind: device.kind,
                result,
            });
        }

        let ledger_saved = if self.dry_run {
            tracing::info!("dry run, ledger not saved");
            false
        } else {
            tracker.save()?;
            true
        };

        Ok(RunReport {
            evaluated_at: ctx.now(),
            devices: reports,
            ledger_saved,
        })
    }
}
