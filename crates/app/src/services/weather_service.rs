//! Weather service: cloud cover with a local freshness cache.
//!
//! Weather only ever nudges rule times, so this service never fails: any
//! problem is logged and the best value available is used instead.

use chrono::Duration;
use sunswitch_domain::location::{CloudCover, Location};
use sunswitch_domain::time::Timestamp;

use crate::ports::{CachedWeather, WeatherCache, WeatherProvider};

/// Default freshness window of a cached reading.
pub const DEFAULT_MAX_AGE: Duration = Duration::hours(1);

/// Application service resolving the cloud cover of a run.
pub struct WeatherService<P, C> {
    provider: P,
    cache: C,
    max_age: Duration,
}

impl<P: WeatherProvider, C: WeatherCache> WeatherService<P, C> {
    /// Create a service with the default one hour freshness window.
    pub fn new(provider: P, cache: C) -> Self {
        Self {
            provider,
            cache,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Resolve the cloud cover at `location` as of `now`.
    ///
    /// A fresh cached reading is returned without any request. Otherwise
    /// the provider is queried and a successful reading replaces the cache.
    /// When the fetch fails, the stale cached value is used, or
    /// [`CloudCover::UNKNOWN`] when there is none.
    #[tracing::instrument(skip(self, location))]
    pub async fn cloud_cover(&self, location: &Location, now: Timestamp) -> CloudCover {
        let cached = match self.cache.load() {
            Ok(cached) => cached,
            Err(err) => {
                tracing::warn!(%err, "unable to read weather cache");
                None
            }
        };

        if let Some(reading) = cached
            && now - reading.fetched_at < self.max_age
        {
            tracing::debug!(cloud_cover = %reading.cloud_cover, "using cached weather");
            return reading.cloud_cover;
        }

        match self
            .provider
            .fetch_cloud_cover(location.latitude, location.longitude)
            .await
        {
            Ok(cloud_cover) => {
                let reading = CachedWeather {
                    cloud_cover,
                    fetched_at: now,
                };
                if let Err(err) = self.cache.store(&reading) {
                    tracing::warn!(%err, "unable to write weather cache");
                }
                tracing::debug!(%cloud_cover, "fetched weather");
                cloud_cover
            }
            Err(err) => {
                let fallback = cached.map_or(CloudCover::UNKNOWN, |reading| reading.cloud_cover);
                tracing::warn!(%err, %fallback, "weather fetch failed, using fallback");
                fallback
            }
        }
    }
}
