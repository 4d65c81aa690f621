//! Resolved rule: a rule's bounds pinned to concrete instants for one run.

use crate::time::LocalTime;

/// Outcome of evaluating a [`RuleSpec`](super::RuleSpec) against a time context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRule {
    /// `None` when the rule was filtered out before resolution.
    pub time_on: Option<LocalTime>,
    pub time_off: Option<LocalTime>,
    pub on_is_exact: bool,
    pub off_is_exact: bool,
    /// `false` when the rule does not apply today.
    pub valid: bool,
    /// `true` when "now" lies inside `[time_on, time_off)`.
    pub enabled: bool,
}

impl ResolvedRule {
    /// A rule skipped by its day-of-week filter.
    #[must_use]
    pub fn day_filtered() -> Self {
        Self {
            time_on: None,
            time_off: None,
            on_is_exact: false,
            off_is_exact: false,
            valid: false,
            enabled: false,
        }
    }
}

impl std::fmt::Display for ResolvedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.time_on, self.time_off) {
            (Some(on), Some(off)) => write!(
                f,
                "on {} off {} enabled={}",
                on.format("%Y-%m-%d %H:%M"),
                off.format("%Y-%m-%d %H:%M"),
                self.enabled
            ),
            _ => f.write_str("unresolved (day filtered)"),
        }
    }
}
