//! Override tracker: remembers what the controller last applied to each switch.
//!
//! A device whose observed state differs from the last state the controller
//! applied has been changed by hand. The tracker owns the ledger for the
//! whole run and writes it back exactly once, through [`OverrideTracker::save`].

use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::ledger::{LedgerKey, OverrideLedger};
use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::Timestamp;

use crate::ports::LedgerStore;

/// Load/mutate/save lifecycle around an [`OverrideLedger`].
pub struct OverrideTracker<S> {
    store: S,
    ledger: OverrideLedger,
}

impl<S: LedgerStore> OverrideTracker<S> {
    /// Load the persisted ledger, or start empty when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Ledger`] when the ledger exists but cannot be read.
    pub fn load(store: S) -> Result<Self, SunswitchError> {
        let ledger = store.load()?;
        tracing::debug!(entries = ledger.len(), "override ledger loaded");
        Ok(Self { store, ledger })
    }

    #[must_use]
    pub fn ledger(&self) -> &OverrideLedger {
        &self.ledger
    }

    #[must_use]
    pub fn get(&self, device: &str, key: LedgerKey) -> Option<&str> {
        self.ledger.get(device, key)
    }

    /// State the controller last applied to `device`, if it is still tracked.
    ///
    /// Unparseable values are ignored, which resumes automatic control.
    #[must_use]
    pub fn auto_changed(&self, device: &str) -> Option<PowerState> {
        let raw = self.get(device, LedgerKey::AutoChanged)?;
        let state = PowerState::from_bit_str(raw);
        if state.is_none() {
            tracing::warn!(device, value = raw, "ignoring malformed ledger entry");
        }
        state
    }

    /// Record that the controller itself set `device` to `state` at `at`.
    pub fn set_auto_changed(&mut self, device: &str, state: PowerState, at: Timestamp) {
        self.ledger
            .set(device, LedgerKey::AutoChanged, state.as_bit().to_string());
        self.ledger
            .set(device, LedgerKey::AutoTimestamp, at.to_rfc3339());
    }

    /// Forget the last applied state of `device`, ending an override.
    pub fn clear_auto_changed(&mut self, device: &str) {
        self.ledger.remove(device, LedgerKey::AutoChanged);
        self.ledger.remove(device, LedgerKey::AutoTimestamp);
    }

    /// Persist the ledger. Consumes the tracker: a run saves at most once.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::Ledger`] when the ledger cannot be written.
    pub fn save(self) -> Result<OverrideLedger, SunswitchError> {
        self.store.save(&self.ledger)?;
        tracing::debug!(entries = self.ledger.len(), "override ledger saved");
        Ok(self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::InMemoryLedgerStore;
    use chrono::{TimeZone, Utc};

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2015, 9, 30, 5, 30, 0).unwrap()
    }

    #[test]
    fn should_start_empty_without_prior_ledger() {
        let store = InMemoryLedgerStore::default();
        let tracker = OverrideTracker::load(&store).unwrap();
        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.auto_changed("porch"), None);
    }

    #[test]
    fn should_record_state_and_timestamp() {
        let store = InMemoryLedgerStore::default();
        let mut tracker = OverrideTracker::load(&store).unwrap();
        tracker.set_auto_changed("porch", PowerState::On, at());

        assert_eq!(tracker.auto_changed("porch"), Some(PowerState::On));
        assert_eq!(tracker.get("porch", LedgerKey::AutoChanged), Some("1"));
        assert_eq!(
            tracker.get("porch", LedgerKey::AutoTimestamp),
            Some("2015-09-30T05:30:00+00:00")
        );
    }

    #[test]
    fn should_clear_both_keys() {
        let store = InMemoryLedgerStore::default();
        let mut tracker = OverrideTracker::load(&store).unwrap();
        tracker.set_auto_changed("porch", PowerState::Off, at());
        tracker.clear_auto_changed("porch");
        assert!(tracker.ledger().is_empty());
    }

    #[test]
    fn should_ignore_malformed_values() {
        let mut ledger = OverrideLedger::new();
        ledger.set("porch", LedgerKey::AutoChanged, "maybe");
        let store = InMemoryLedgerStore::with(ledger);
        let tracker = OverrideTracker::load(&store).unwrap();
        assert_eq!(tracker.auto_changed("porch"), None);
    }

    #[test]
    fn should_propagate_load_errors() {
        let store = InMemoryLedgerStore::failing_load();
        let Err(err) = OverrideTracker::load(&store) else {
            panic!("expected a ledger error");
        };
        assert!(matches!(err, SunswitchError::Ledger(_)));
    }

    #[test]
    fn should_round_trip_through_store() {
        let store = InMemoryLedgerStore::default();
        let mut tracker = OverrideTracker::load(&store).unwrap();
        tracker.set_auto_changed("porch", PowerState::On, at());
        tracker.set_auto_changed("garden", PowerState::Off, at());
        let written = tracker.save().unwrap();

        let reloaded = OverrideTracker::load(&store).unwrap();
        assert_eq!(reloaded.ledger(), &written);
        assert_eq!(store.saves(), 1);
    }
}
