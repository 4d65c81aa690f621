//! # sunswitch-adapter-weather-http
//!
//! Weather adapters:
//!
//! - [`HttpWeatherProvider`]: current cloud cover from a forecast HTTP API
//! - [`FileWeatherCache`]: the last reading, cached in a JSON file
//!
//! ## Dependency rule
//!
//! Depends on `sunswitch-app` (port traits) and `sunswitch-domain` only.

mod cache;
mod error;
mod provider;

pub use cache::FileWeatherCache;
pub use error::WeatherError;
pub use provider::HttpWeatherProvider;
