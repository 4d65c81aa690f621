//! # sunswitch-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceDriver`: discover devices, read and set their power state
//!   - `SolarCalculator`: sunrise/sunset for a place and day
//!   - `WeatherProvider` / `WeatherCache`: cloud cover and its on-disk cache
//!   - `LedgerStore`: load & save the override ledger
//!   - `ChangeLog`: human-readable record of state transitions
//! - Define the **use-cases** of a run:
//!   - `time_context::create`: build the per-run time snapshot
//!   - `WeatherService`: cached cloud cover with graceful fallback
//!   - `OverrideTracker`: detect manual overrides through the ledger
//!   - `Reconciler`: converge one device towards its expected state
//!   - `ControlRun`: one batch pass over every configured device
//!
//! ## Dependency rule
//! Depends on `sunswitch-domain` only (plus `tokio::time` for fade delays).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
