//! Override ledger: what the controller itself last wrote to each device.
//!
//! The ledger is a flat key → value map with keys of the form
//! `"<device>:<setting>"`. It is loaded once at the start of a run, mutated
//! while devices are reconciled, and written back once at the end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings tracked per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    /// Last power state (`"0"` / `"1"`) the controller applied.
    AutoChanged,
    /// When that state was applied (RFC 3339).
    AutoTimestamp,
}

impl LedgerKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoChanged => "auto-changed",
            Self::AutoTimestamp => "auto-timestamp",
        }
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat, ordered key-value store persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideLedger {
    entries: BTreeMap<String, String>,
}

impl OverrideLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw entries read from storage.
    #[must_use]
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Storage key for a device setting.
    #[must_use]
    pub fn key(device: &str, key: LedgerKey) -> String {
        format!("{device}:{key}")
    }

    #[must_use]
    pub fn get(&self, device: &str, key: LedgerKey) -> Option<&str> {
        self.entries
            .get(&Self::key(device, key))
            .map(String::as_str)
    }

    pub fn set(&mut self, device: &str, key: LedgerKey, value: impl Into<String>) {
        self.entries.insert(Self::key(device, key), value.into());
    }

    /// Remove a setting, returning its previous value.
    pub fn remove(&mut self, device: &str, key: LedgerKey) -> Option<String> {
        self.entries.remove(&Self::key(device, key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_keys_as_device_colon_setting() {
        assert_eq!(
            OverrideLedger::key("porch", LedgerKey::AutoChanged),
            "porch:auto-changed"
        );
        assert_eq!(
            OverrideLedger::key("porch", LedgerKey::AutoTimestamp),
            "porch:auto-timestamp"
        );
    }

    #[test]
    fn should_set_get_and_remove_values() {
        let mut ledger = OverrideLedger::new();
        ledger.set("porch", LedgerKey::AutoChanged, "1");
        assert_eq!(ledger.get("porch", LedgerKey::AutoChanged), Some("1"));
        assert_eq!(ledger.get("garden", LedgerKey::AutoChanged), None);

        assert_eq!(
            ledger.remove("porch", LedgerKey::AutoChanged),
            Some("1".to_string())
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn should_serialize_as_flat_object() {
        let mut ledger = OverrideLedger::new();
        ledger.set("porch", LedgerKey::AutoChanged, "0");
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json, serde_json::json!({"porch:auto-changed": "0"}));
    }

    #[test]
    fn should_keep_unrelated_keys_when_loading() {
        let json = serde_json::json!({"porch:auto-changed": "1", "legacy:other": "x"});
        let ledger: OverrideLedger = serde_json::from_value(json).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("porch", LedgerKey::AutoChanged), Some("1"));
    }
}
