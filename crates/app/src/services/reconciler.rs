//! Reconciler: converges one device towards its expected power state.
//!
//! Switches follow the override state machine: a switch whose observed
//! state differs from the last state the controller applied was changed by
//! hand and is left alone until reality catches up with the rules.
//! Lights are not override-tracked; they are faded then switched whenever
//! their observed state differs from the expected one.

use std::time::Duration;

use sunswitch_domain::device::{Device, DeviceKind};
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::Timestamp;

use crate::ports::{ChangeLog, DeviceDriver, DeviceHandle, LedgerStore, SetStateCommand};
use crate::services::override_tracker::OverrideTracker;

/// Override status of a switch for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideStatus {
    /// The controller has no record for this device, or the device still
    /// holds the state the controller applied.
    NoOverride,
    /// Someone changed the device and it disagrees with the rules.
    Overridden,
    /// Someone changed the device, and it now matches the rules anyway.
    Converged,
}

/// Classify a switch from its observed, last applied and expected states.
#[must_use]
pub fn override_status(
    current: PowerState,
    auto_changed: Option<PowerState>,
    expected: PowerState,
) -> OverrideStatus {
    match auto_changed {
        Some(applied) if applied != current => {
            if current == expected {
                OverrideStatus::Converged
            } else {
                OverrideStatus::Overridden
            }
        }
        _ => OverrideStatus::NoOverride,
    }
}

/// What reconciling a device did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Already in the expected state; nothing sent.
    Unchanged,
    /// A command was sent to reach this state.
    Changed(PowerState),
    /// Manual override in effect; nothing sent.
    Overridden,
    /// Dry run: this state would have been applied.
    WouldChange(PowerState),
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Changed(state) => write!(f, "switched {state}"),
            Self::Overridden => f.write_str("overridden"),
            Self::WouldChange(state) => write!(f, "would switch {state}"),
        }
    }
}

/// Timing of the light fade sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeSettings {
    /// Brightness ramp duration requested from the device.
    pub transition: Duration,
    /// Wait between the ramp and the final power command.
    pub settle: Duration,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            transition: Duration::from_secs(10),
            settle: Duration::from_secs(30),
        }
    }
}

/// Sends the commands that bring a device to its expected state.
pub struct Reconciler<'a, D, L> {
    driver: &'a D,
    change_log: &'a L,
    fade: FadeSettings,
    dry_run: bool,
}

impl<'a, D: DeviceDriver, L: ChangeLog> Reconciler<'a, D, L> {
    pub fn new(driver: &'a D, change_log: &'a L) -> Self {
        Self {
            driver,
            change_log,
            fade: FadeSettings::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_fade(mut self, fade: FadeSettings) -> Self {
        self.fade = fade;
        self
    }

    /// In dry-run mode the reconciler reads state but never sends commands.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile `device`, reached through `handle`, according to its kind.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Driver`] when the device cannot be queried or
    /// commanded. The ledger is left untouched in that case.
    pub async fn reconcile<S: LedgerStore>(
        &self,
        device: &Device,
        handle: &DeviceHandle,
        tracker: &mut OverrideTracker<S>,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, SunswitchError> {
        match device.kind {
            DeviceKind::Switch => self.reconcile_switch(device, handle, tracker, now).await,
            DeviceKind::Light => self.reconcile_light(device, handle, now).await,
        }
    }

    /// Run the override state machine for a switch.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Driver`] when the device cannot be reached.
    #[tracing::instrument(skip_all, fields(device = %device.name))]
    pub async fn reconcile_switch<S: LedgerStore>(
        &self,
        device: &Device,
        handle: &DeviceHandle,
        tracker: &mut OverrideTracker<S>,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, SunswitchError> {
        let current = self.driver.get_state(handle, true).await?.state;
        let expected = device.expected_state();
        let applied = tracker.auto_changed(&device.name);

        match override_status(current, applied, expected) {
            OverrideStatus::Overridden => {
                tracing::info!(%current, %expected, "manual override in effect, skipping");
                return Ok(ReconcileOutcome::Overridden);
            }
            OverrideStatus::Converged => {
                tracing::info!(%current, "manual override converged, resuming control");
                tracker.clear_auto_changed(&device.name);
            }
            OverrideStatus::NoOverride => {}
        }

        if current == expected {
            tracing::debug!(%current, "already in expected state");
            return Ok(ReconcileOutcome::Unchanged);
        }
        if self.dry_run {
            tracing::info!(%current, %expected, "dry run, not switching");
            return Ok(ReconcileOutcome::WouldChange(expected));
        }

        self.driver
            .set_state(handle, SetStateCommand::power(expected))
            .await?;
        self.change_log.record(&device.name, expected, now);
        tracker.set_auto_changed(&device.name, expected, now);
        tracing::info!(%expected, "switched");
        Ok(ReconcileOutcome::Changed(expected))
    }

    /// Fade a light towards its expected state, then switch it.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Driver`] when the device cannot be reached.
    #[tracing::instrument(skip_all, fields(device = %device.name))]
    pub async fn reconcile_light(
        &self,
        device: &Device,
        handle: &DeviceHandle,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, SunswitchError> {
        let status = self.driver.get_state(handle, true).await?;
        let expected = device.expected_state();

        if status.state == expected {
            tracing::debug!(current = %status.state, "already in expected state");
            return Ok(ReconcileOutcome::Unchanged);
        }
        if self.dry_run {
            tracing::info!(current = %status.state, %expected, "dry run, not fading");
            return Ok(ReconcileOutcome::WouldChange(expected));
        }

        tracing::debug!(
            %expected,
            transition_ms = self.fade.transition.as_millis(),
            settle_secs = self.fade.settle.as_secs(),
            "fading"
        );
        self.driver
            .set_state(handle, SetStateCommand::fade(expected, self.fade.transition))
            .await?;
        tokio::time::sleep(self.fade.settle).await;
        self.driver
            .set_state(handle, SetStateCommand::power(expected))
            .await?;
        self.change_log.record(&device.name, expected, now);
        tracing::info!(%expected, "switched");
        Ok(ReconcileOutcome::Changed(expected))
    }
}
