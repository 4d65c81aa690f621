//! # sunswitch: one control run
//!
//! Composition root that wires all adapters together and executes a single
//! batch run. Meant to be triggered periodically by an external scheduler
//! (cron, a systemd timer, …). Run at most one instance at a time: the
//! ledger file is not locked.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars, `--dry-run`)
//! - Initialise logging
//! - Resolve the cloud cover through the weather service
//! - Construct the driver, ledger, change log and solar adapters
//! - Execute the control run and exit non-zero on fatal errors
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod change_log;
mod config;
mod driver;

use std::process::ExitCode;

use anyhow::Context;
use sunswitch_adapter_ledger_json::JsonLedgerStore;
use sunswitch_adapter_solar::SunriseCalculator;
use sunswitch_adapter_weather_http::{FileWeatherCache, HttpWeatherProvider};
use sunswitch_app::services::control_run::{ControlRun, RunReport};
use sunswitch_app::services::weather_service::WeatherService;
use sunswitch_domain::location::{CloudCover, Location};
use sunswitch_domain::time::{Timestamp, now};
use tracing_subscriber::EnvFilter;

use crate::change_log::FileChangeLog;
use crate::config::Config;
use crate::driver::Driver;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sunswitch: {:?}", anyhow::Error::from(err));
            return ExitCode::FAILURE;
        }
    };
    if std::env::args().skip(1).any(|arg| arg == "--dry-run") {
        config.dry_run = true;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    match run(&config).await {
        Ok(report) => {
            for device in &report.devices {
                tracing::info!(
                    device = %device.name,
                    kind = %device.kind,
                    expected = %device.expected,
                    result = %device.result,
                    "device done"
                );
            }
            tracing::info!(
                evaluated_at = %report.evaluated_at,
                changed = report.changed(),
                failed = report.failed(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = ?err, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<RunReport> {
    let location = config.location().context("invalid location")?;
    let started_at = now();
    let cloud_cover = cloud_cover(config, &location, started_at).await;

    let driver = Driver::from_config(config).context("unable to start device driver")?;
    let mut control = ControlRun::new(
        location,
        config.device_specs(),
        driver,
        FileChangeLog::new(&config.change_log.path, location.timezone),
        JsonLedgerStore::new(&config.ledger.path),
        SunriseCalculator,
    )
    .with_discovery_timeout(config.discovery_timeout())
    .with_fade(config.fade_settings())
    .with_dry_run(config.dry_run);

    control
        .execute(started_at, cloud_cover)
        .await
        .context("control run aborted")
}

/// Current cloud cover. Weather problems never abort a run.
async fn cloud_cover(config: &Config, location: &Location, at: Timestamp) -> CloudCover {
    let Some(api_key) = config.weather_api_key() else {
        tracing::debug!("no weather API key, cloud adjustments disabled");
        return CloudCover::UNKNOWN;
    };
    let provider = match HttpWeatherProvider::new(&config.weather.base_url, api_key) {
        Ok(provider) => provider,
        Err(err) => {
            tracing::warn!(error = ?err, "unable to create weather client, assuming clear sky");
            return CloudCover::UNKNOWN;
        }
    };
    let service = WeatherService::new(provider, FileWeatherCache::new(&config.weather.cache_path))
        .with_max_age(config.weather_max_age());
    service.cloud_cover(location, at).await
}
