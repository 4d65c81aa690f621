//! Weather ports: live cloud cover and the local cache in front of it.

use std::future::Future;

use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::location::CloudCover;
use sunswitch_domain::time::Timestamp;

/// Remote source of the current cloud cover.
pub trait WeatherProvider {
    /// Fetch the current cloud cover at (`latitude`, `longitude`).
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::WeatherFetch`] on network or payload failures.
    fn fetch_cloud_cover(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<CloudCover, SunswitchError>> + Send;
}

/// A cloud cover reading and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedWeather {
    pub cloud_cover: CloudCover,
    pub fetched_at: Timestamp,
}

/// Persistent cache for the last weather reading.
pub trait WeatherCache {
    /// Read the cached reading, `None` when nothing was cached yet.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::WeatherFetch`] when the cache exists but cannot be read.
    fn load(&self) -> Result<Option<CachedWeather>, SunswitchError>;

    /// Replace the cached reading.
    ///
    /// # Errors
    ///
    /// Returns [`SunswitchError::WeatherFetch`] when the cache cannot be written.
    fn store(&self, reading: &CachedWeather) -> Result<(), SunswitchError>;
}
