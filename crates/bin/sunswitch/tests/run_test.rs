//! End-to-end tests for a full control run.
//!
//! Each test wires the real adapters (virtual driver, JSON ledger in a
//! temporary directory, sunrise calculator where it matters) into a
//! `ControlRun` and drives it over several runs, the way a scheduler would.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sunswitch_adapter_ledger_json::JsonLedgerStore;
use sunswitch_adapter_solar::SunriseCalculator;
use sunswitch_adapter_virtual::VirtualDriver;
use sunswitch_app::ports::{ChangeLog, LedgerStore, SolarCalculator, SunTimes};
use sunswitch_app::services::control_run::{ControlRun, DeviceResult};
use sunswitch_app::services::reconciler::{FadeSettings, ReconcileOutcome};
use sunswitch_domain::device::{DeviceKind, DeviceSpec};
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::ledger::LedgerKey;
use sunswitch_domain::location::{CloudCover, Location};
use sunswitch_domain::power::PowerState::{self, Off, On};
use sunswitch_domain::rule::{RuleBound, RuleSpec};
use sunswitch_domain::time::Timestamp;
use tempfile::TempDir;

/// Sunrise at 07:00 and sunset at 19:00 UTC, every day.
struct FixedSolar;

impl SolarCalculator for FixedSolar {
    fn sun_times(&self, _lat: f64, _long: f64, date: NaiveDate) -> Result<SunTimes, SunswitchError> {
        let at = |h| Utc.from_utc_datetime(&date.and_hms_opt(h, 0, 0).unwrap());
        Ok(SunTimes {
            sunrise: at(7),
            sunset: at(19),
        })
    }
}

#[derive(Default)]
struct Changes(Mutex<Vec<String>>);

impl Changes {
    fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ChangeLog for Changes {
    fn record(&self, device: &str, state: PowerState, _at: Timestamp) {
        self.0.lock().unwrap().push(format!("{device} -> {state}"));
    }
}

const NO_WAIT: FadeSettings = FadeSettings {
    transition: Duration::from_secs(10),
    settle: Duration::ZERO,
};

fn greenwich() -> Location {
    Location::new(chrono_tz::UTC, 51.48, 0.0).unwrap()
}

fn at(h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2015, 9, 30, h, m, 0).unwrap()
}

fn five_to_sunset() -> Vec<RuleSpec> {
    vec![RuleSpec::new(
        RuleBound::exact(NaiveTime::from_hms_opt(5, 0, 0).unwrap()),
        RuleBound::sunset(0),
    )]
}

fn specs() -> Vec<DeviceSpec> {
    vec![
        DeviceSpec::new("Porch", DeviceKind::Switch, five_to_sunset()),
        DeviceSpec::new("Living Room", DeviceKind::Light, five_to_sunset()),
    ]
}

fn driver() -> VirtualDriver {
    VirtualDriver::new()
        .with_switch("porch", Off)
        .with_light("living room", Off)
}

fn outcome(result: &DeviceResult) -> Option<ReconcileOutcome> {
    match result {
        DeviceResult::Reconciled(outcome) => Some(*outcome),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Switching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_switch_devices_on_and_off_through_the_day() {
    let dir = TempDir::new().unwrap();
    let changes = Changes::default();
    let ledger = JsonLedgerStore::new(dir.path().join("ledger.json"));
    let mut run = ControlRun::new(greenwich(), specs(), driver(), &changes, &ledger, FixedSolar)
        .with_fade(NO_WAIT);

    let morning = run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(morning.changed(), 2);
    assert_eq!(run.driver().status("porch").unwrap().state, On);
    assert_eq!(run.driver().status("living room").unwrap().state, On);

    let noon = run.execute(at(12, 0), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(noon.changed(), 0);

    let night = run.execute(at(20, 0), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(night.changed(), 2);
    assert_eq!(run.driver().status("porch").unwrap().state, Off);
    assert_eq!(run.driver().status("living room").unwrap().state, Off);

    assert_eq!(
        changes.lines(),
        vec![
            "porch -> ON",
            "living room -> ON",
            "porch -> OFF",
            "living room -> OFF"
        ]
    );
}

#[tokio::test]
async fn should_persist_switch_history_in_ledger_file() {
    let dir = TempDir::new().unwrap();
    let ledger = JsonLedgerStore::new(dir.path().join("ledger.json"));
    let mut run = ControlRun::new(greenwich(), specs(), driver(), Changes::default(), &ledger, FixedSolar)
        .with_fade(NO_WAIT);

    let report = run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap();
    assert!(report.ledger_saved);

    let saved = ledger.load().unwrap();
    assert_eq!(saved.get("porch", LedgerKey::AutoChanged), Some("1"));
    assert_eq!(
        saved.get("porch", LedgerKey::AutoTimestamp),
        Some("2015-09-30T06:00:00+00:00")
    );
    assert_eq!(saved.get("living room", LedgerKey::AutoChanged), None);
}

// ---------------------------------------------------------------------------
// Manual overrides
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_respect_manual_override_until_rules_agree() {
    let dir = TempDir::new().unwrap();
    let changes = Changes::default();
    let ledger = JsonLedgerStore::new(dir.path().join("ledger.json"));
    let mut run = ControlRun::new(greenwich(), specs(), driver(), &changes, &ledger, FixedSolar)
        .with_fade(NO_WAIT);

    run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap();
    assert!(run.driver().operate("porch", Off));

    let noon = run.execute(at(12, 0), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(
        outcome(&noon.device("porch").unwrap().result),
        Some(ReconcileOutcome::Overridden)
    );
    assert_eq!(run.driver().status("porch").unwrap().state, Off);

    // Sunset: the rules now want the porch off too.
    let night = run.execute(at(20, 0), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(
        outcome(&night.device("porch").unwrap().result),
        Some(ReconcileOutcome::Unchanged)
    );
    assert_eq!(ledger.load().unwrap().get("porch", LedgerKey::AutoChanged), None);

    // Next morning the controller is back in charge.
    let next = ControlRun::new(greenwich(), specs(), driver(), &changes, &ledger, FixedSolar)
        .with_fade(NO_WAIT)
        .execute(Utc.with_ymd_and_hms(2015, 10, 1, 6, 0, 0).unwrap(), CloudCover::UNKNOWN)
        .await
        .unwrap();
    assert_eq!(
        outcome(&next.device("porch").unwrap().result),
        Some(ReconcileOutcome::Changed(On))
    );
}

// ---------------------------------------------------------------------------
// Dry run & failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_leave_devices_and_ledger_alone_in_dry_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");
    let changes = Changes::default();
    let mut run = ControlRun::new(
        greenwich(),
        specs(),
        driver(),
        &changes,
        JsonLedgerStore::new(&path),
        FixedSolar,
    )
    .with_dry_run(true);

    let report = run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap();

    assert!(!report.ledger_saved);
    assert_eq!(
        outcome(&report.device("porch").unwrap().result),
        Some(ReconcileOutcome::WouldChange(On))
    );
    assert!(run.driver().commands().is_empty());
    assert!(changes.lines().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn should_skip_unreachable_and_missing_devices() {
    let dir = TempDir::new().unwrap();
    let mut specs = specs();
    specs.push(DeviceSpec::new("Garden", DeviceKind::Switch, five_to_sunset()));
    let driver = driver();
    driver.set_unreachable("living room", true);
    let mut run = ControlRun::new(
        greenwich(),
        specs,
        driver,
        Changes::default(),
        JsonLedgerStore::new(dir.path().join("ledger.json")),
        FixedSolar,
    )
    .with_fade(NO_WAIT);

    let report = run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap();

    assert_eq!(report.changed(), 1);
    assert_eq!(report.failed(), 2);
    assert!(matches!(report.device("garden").unwrap().result, DeviceResult::Missing));
    assert!(matches!(
        report.device("living room").unwrap().result,
        DeviceResult::Failed(_)
    ));
    assert!(report.ledger_saved);
}

#[tokio::test]
async fn should_abort_on_corrupted_ledger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut run = ControlRun::new(
        greenwich(),
        specs(),
        driver(),
        Changes::default(),
        JsonLedgerStore::new(&path),
        FixedSolar,
    );

    let err = run.execute(at(6, 0), CloudCover::UNKNOWN).await.unwrap_err();

    assert!(matches!(err, SunswitchError::Ledger(_)));
    assert!(run.driver().commands().is_empty());
}

// ---------------------------------------------------------------------------
// Real solar calculation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_follow_computed_sunset_in_local_time() {
    let dir = TempDir::new().unwrap();
    let paris = Location::new(chrono_tz::Europe::Paris, 48.85, 2.35).unwrap();
    let specs = vec![DeviceSpec::new(
        "Porch",
        DeviceKind::Switch,
        vec![RuleSpec::new(RuleBound::sunset(0), RuleBound::exact(NaiveTime::from_hms_opt(23, 0, 0).unwrap()))],
    )];
    let mut run = ControlRun::new(
        paris,
        specs,
        driver(),
        Changes::default(),
        JsonLedgerStore::new(dir.path().join("ledger.json")),
        SunriseCalculator,
    );

    // Sunset in Paris on 2015-09-30 is around 19:25 local, 17:25 UTC.
    let before = run.execute(at(16, 30), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(before.device("porch").unwrap().expected, Off);

    let after = run.execute(at(18, 30), CloudCover::UNKNOWN).await.unwrap();
    assert_eq!(after.device("porch").unwrap().expected, On);
    assert_eq!(run.driver().status("porch").unwrap().state, On);
}
