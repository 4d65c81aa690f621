//! Device: a controlled switch or light and the state it should be in.

use serde::{Deserialize, Serialize};

use crate::power::PowerState;
use crate::rule::{ResolvedRule, RuleSpec, evaluate};
use crate::time_context::TimeContext;

/// What kind of hardware a device is, which decides how it is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Binary on/off device with manual-override tracking.
    Switch,
    /// Dimmable device, faded between states and never override-tracked.
    Light,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch => f.write_str("switch"),
            Self::Light => f.write_str("light"),
        }
    }
}

/// A device as declared in configuration, before any evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub name: String,
    pub kind: DeviceKind,
    pub rules: Vec<RuleSpec>,
}

impl DeviceSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeviceKind, rules: Vec<RuleSpec>) -> Self {
        Self {
            name: name.into(),
            kind,
            rules,
        }
    }

    /// Resolve this device's rules for the current run.
    #[must_use]
    pub fn build(&self, ctx: &TimeContext) -> Device {
        Device::build(&self.name, self.kind, ctx, &self.rules)
    }
}

/// A configured device with its rules resolved for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Lower-cased name, matched case-insensitively against driver names.
    pub name: String,
    pub kind: DeviceKind,
    /// Rules that apply today, in configuration order.
    pub rules: Vec<ResolvedRule>,
    /// `true` when any retained rule is enabled.
    pub expected_on: bool,
}

impl Device {
    /// Evaluate every rule and derive the expected power state.
    ///
    /// Day-filtered rules are dropped. A device with no applicable rule is
    /// expected to be off.
    #[must_use]
    pub fn build(name: &str, kind: DeviceKind, ctx: &TimeContext, specs: &[RuleSpec]) -> Self {
        let rules: Vec<ResolvedRule> = specs
            .iter()
            .map(|spec| evaluate(ctx, spec))
            .filter(|rule| rule.valid)
            .collect();
        let expected_on = rules.iter().any(|rule| rule.enabled);
        Self {
            name: normalize_name(name),
            kind,
            rules,
            expected_on,
        }
    }

    #[must_use]
    pub fn expected_state(&self) -> PowerState {
        PowerState::from(self.expected_on)
    }
}

/// Case-insensitive device key.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} expected {} ({} rule(s))",
            self.kind,
            self.name,
            self.expected_state(),
            self.rules.len()
        )
    }
}
