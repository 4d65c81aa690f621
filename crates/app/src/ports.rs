//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod change_log;
pub mod device_driver;
pub mod ledger_store;
pub mod solar;
pub mod weather;

pub use change_log::ChangeLog;
pub use device_driver::{DeviceDriver, DeviceHandle, DeviceStatus, SetStateCommand};
pub use ledger_store::LedgerStore;
pub use solar::{SolarCalculator, SunTimes};
pub use weather::{CachedWeather, WeatherCache, WeatherProvider};
