//! Rule: one on/off time window for a device.
//!
//! Rules are declared in configuration as a bag of optional keys
//! (`on`, `onSunrise`, `onSunset`, `onAdjustClouds`, and the same for `off`),
//! validated once at load time into a [`RuleSpec`], then resolved against a
//! [`TimeContext`] on every run.

mod bound;
mod resolved;

pub use bound::{BoundSide, MAX_OFFSET_MINUTES, RuleBound, TimeBound, parse_clock_time};
pub use resolved::ResolvedRule;

use chrono::Duration;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::time_context::TimeContext;
use crate::weekday::WeekdaySet;

/// Rule options exactly as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawRuleSpec {
    pub on: Option<String>,
    pub on_sunrise: Option<i64>,
    pub on_sunset: Option<i64>,
    pub on_adjust_clouds: Option<i64>,
    pub off: Option<String>,
    pub off_sunrise: Option<i64>,
    pub off_sunset: Option<i64>,
    pub off_adjust_clouds: Option<i64>,
    pub days_of_week: Option<WeekdaySet>,
    /// Legacy flag: restrict the rule to Monday–Friday.
    pub weekday_only: Option<bool>,
}

/// A validated on/off window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRuleSpec")]
pub struct RuleSpec {
    pub on: RuleBound,
    pub off: RuleBound,
    /// `None` means every day. `Some` of an empty set never matches.
    pub days_of_week: Option<WeekdaySet>,
}

impl RuleSpec {
    /// Window between two bounds, active every day.
    #[must_use]
    pub fn new(on: RuleBound, off: RuleBound) -> Self {
        Self {
            on,
            off,
            days_of_week: None,
        }
    }

    /// Restrict the rule to the given days.
    #[must_use]
    pub fn on_days(mut self, days: WeekdaySet) -> Self {
        self.days_of_week = Some(days);
        self
    }
}

impl TryFrom<RawRuleSpec> for RuleSpec {
    type Error = ConfigError;

    fn try_from(raw: RawRuleSpec) -> Result<Self, Self::Error> {
        let on = RuleBound::from_options(
            BoundSide::On,
            raw.on.as_deref(),
            raw.on_sunrise,
            raw.on_sunset,
            raw.on_adjust_clouds,
        )?;
        let off = RuleBound::from_options(
            BoundSide::Off,
            raw.off.as_deref(),
            raw.off_sunrise,
            raw.off_sunset,
            raw.off_adjust_clouds,
        )?;

        let mut days_of_week = raw.days_of_week.filter(|days| !days.is_empty());
        if raw.weekday_only == Some(true) {
            days_of_week = Some(
                days_of_week.map_or(WeekdaySet::WORKDAYS, |d| d.intersection(WeekdaySet::WORKDAYS)),
            );
        }

        Ok(Self {
            on,
            off,
            days_of_week,
        })
    }
}

impl std::fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.on, self.off)?;
        if let Some(days) = self.days_of_week {
            write!(f, " on days {days}")?;
        }
        Ok(())
    }
}

/// Resolve a rule against the run's time context.
///
/// A day-of-week mismatch short-circuits to an invalid, disabled rule
/// without computing any instant. When both bounds are exact clock times and
/// `off` falls before `on`, `off` moves to the next day. Sunrise/sunset
/// bounds never roll over, so a sunset → sunrise window is never active.
#[must_use]
pub fn evaluate(ctx: &TimeContext, spec: &RuleSpec) -> ResolvedRule {
    if spec
        .days_of_week
        .is_some_and(|days| !ctx.is_day_of_week(days))
    {
        return ResolvedRule::day_filtered();
    }

    let time_on = spec.on.resolve(ctx);
    let mut time_off = spec.off.resolve(ctx);
    let on_is_exact = spec.on.is_exact();
    let off_is_exact = spec.off.is_exact();

    if on_is_exact && off_is_exact && time_off < time_on {
        time_off += Duration::days(1);
    }

    ResolvedRule {
        time_on: Some(time_on),
        time_off: Some(time_off),
        on_is_exact,
        off_is_exact,
        valid: true,
        enabled: ctx.is_active(time_on, time_off),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::CloudCover;
    use crate::time::LocalTime;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> LocalTime {
        NaiveDate::from_ymd_opt(2015, 9, 30)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ctx(h: u32, m: u32) -> TimeContext {
        TimeContext::new(at(h, m), at(7, 0), at(19, 0), CloudCover::UNKNOWN)
    }

    fn rule(json: serde_json::Value) -> RuleSpec {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn should_be_disabled_before_window() {
        let r = evaluate(&ctx(0, 0), &rule(serde_json::json!({"on": "5:00", "off": "18:00"})));
        assert!(r.valid);
        assert!(!r.enabled);
    }

    #[test]
    fn should_be_enabled_inside_window() {
        let r = evaluate(&ctx(5, 30), &rule(serde_json::json!({"on": "5:00", "off": "18:00"})));
        assert!(r.enabled);
        assert_eq!(r.time_on, Some(at(5, 0)));
        assert_eq!(r.time_off, Some(at(18, 0)));
    }

    #[test]
    fn should_roll_exact_off_over_midnight() {
        let r = evaluate(&ctx(10, 0), &rule(serde_json::json!({"on": "5:00", "off": "2:00"})));
        assert!(r.enabled);
        assert_eq!(r.time_off, Some(at(2, 0) + Duration::days(1)));
    }

    #[test]
    fn should_not_roll_over_sun_relative_windows() {
        // sunset → sunrise crosses midnight but is never rolled over
        let spec = rule(serde_json::json!({"onSunset": 0, "offSunrise": 0}));
        let late = evaluate(&ctx(23, 0), &spec);
        assert!(late.valid);
        assert!(!late.enabled);
        assert_eq!(late.time_off, Some(at(7, 0)));

        let early = evaluate(&ctx(3, 0), &spec);
        assert!(!early.enabled);
    }

    #[test]
    fn should_not_roll_over_mixed_windows() {
        let spec = rule(serde_json::json!({"onSunset": 0, "off": "1:00"}));
        let r = evaluate(&ctx(21, 0), &spec);
        assert!(!r.on_is_exact);
        assert!(r.off_is_exact);
        assert_eq!(r.time_off, Some(at(1, 0)));
        assert!(!r.enabled);
    }

    #[test]
    fn should_mark_rule_invalid_on_other_days() {
        // 2015-09-30 is a Wednesday (2)
        let spec = rule(serde_json::json!({"on": "0:00", "off": "23:59", "daysOfWeek": ["5", "6"]}));
        let r = evaluate(&ctx(12, 0), &spec);
        assert!(!r.valid);
        assert!(!r.enabled);
        assert!(r.time_on.is_none());
        assert!(r.time_off.is_none());
    }

    #[test]
    fn should_keep_rule_valid_on_listed_days() {
        let spec = rule(serde_json::json!({"on": "0:00", "off": "23:59", "daysOfWeek": ["2"]}));
        let r = evaluate(&ctx(12, 0), &spec);
        assert!(r.valid);
        assert!(r.enabled);
    }

    #[test]
    fn should_ignore_empty_days_of_week() {
        let spec = rule(serde_json::json!({"on": "0:00", "off": "23:59", "daysOfWeek": []}));
        assert_eq!(spec.days_of_week, None);
        assert!(evaluate(&ctx(12, 0), &spec).enabled);
    }

    #[test]
    fn should_fold_weekday_only_into_workdays() {
        let spec = rule(serde_json::json!({"on": "0:00", "off": "23:59", "weekdayOnly": true}));
        assert_eq!(spec.days_of_week, Some(WeekdaySet::WORKDAYS));
    }

    #[test]
    fn should_never_match_weekend_days_with_weekday_only() {
        let spec = rule(serde_json::json!({
            "on": "0:00", "off": "23:59", "daysOfWeek": ["6"], "weekdayOnly": true
        }));
        assert_eq!(spec.days_of_week, Some(WeekdaySet::EMPTY));
        assert!(!evaluate(&ctx(12, 0), &spec).valid);
    }

    #[test]
    fn should_prefer_exact_over_sun_relative_sources() {
        let spec = rule(serde_json::json!({"on": "5:00", "onSunset": 0, "off": "6:00"}));
        assert_eq!(spec.on.source, TimeBound::Exact(parse_clock_time("5:00").unwrap()));
    }

    #[test]
    fn should_prefer_sunrise_over_sunset() {
        let spec = rule(serde_json::json!({"onSunrise": 5, "onSunset": 0, "off": "23:00"}));
        assert_eq!(spec.on.source, TimeBound::Sunrise { offset_minutes: 5 });
    }

    #[test]
    fn should_reject_rule_without_on_source() {
        let raw = RawRuleSpec {
            off: Some("18:00".to_string()),
            ..RawRuleSpec::default()
        };
        assert_eq!(
            RuleSpec::try_from(raw),
            Err(ConfigError::MissingBound(BoundSide::On))
        );
    }

    #[test]
    fn should_reject_rule_without_off_source() {
        let result: Result<RuleSpec, _> =
            serde_json::from_value(serde_json::json!({"on": "5:00"}));
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_huge_sun_offset_at_load() {
        let result: Result<RuleSpec, _> = serde_json::from_value(
            serde_json::json!({"on": "5:00", "offSunrise": 9_000_000_000_000_000_000_i64}),
        );
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn should_reject_unknown_rule_keys() {
        let result: Result<RuleSpec, _> =
            serde_json::from_value(serde_json::json!({"on": "5:00", "off": "6:00", "of": "7:00"}));
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_cloud_adjustment_to_sun_bounds() {
        let cloudy = TimeContext::new(
            at(18, 40),
            at(7, 0),
            at(19, 0),
            CloudCover::from_percent(50).unwrap(),
        );
        let spec = rule(serde_json::json!({"onSunset": 0, "onAdjustClouds": -40, "off": "23:00"}));
        let r = evaluate(&cloudy, &spec);
        assert_eq!(r.time_on, Some(at(18, 40)));
        assert!(r.enabled);
    }

    #[test]
    fn should_parse_rules_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            rules: Vec<RuleSpec>,
        }
        let doc: Doc = toml::from_str(
            r#"
            rules = [
                { on = "5:00", off = "18:00" },
                { onSunset = -15, offSunrise = 30, daysOfWeek = ["4", "5"] },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(doc.rules.len(), 2);
        assert_eq!(doc.rules[1].on.source, TimeBound::Sunset { offset_minutes: -15 });
        assert_eq!(
            doc.rules[1].days_of_week,
            Some(WeekdaySet::from_indices([4, 5]).unwrap())
        );
    }

    #[test]
    fn should_display_rule_bounds() {
        let spec = rule(serde_json::json!({"on": "5:00", "offSunset": -15, "daysOfWeek": ["0"]}));
        assert_eq!(spec.to_string(), "05:00 → sunset-15m on days [0]");
    }
}
