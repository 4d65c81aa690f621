//! Forecast API client.
//!
//! Requests `GET {base_url}/forecast/{api_key}/{lat},{long}` and reads the
//! current cloud cover, reported as a fraction between 0 and 1.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use sunswitch_app::ports::WeatherProvider;
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::location::CloudCover;

use crate::error::WeatherError;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    currently: Option<Currently>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Currently {
    cloud_cover: Option<f64>,
}

/// [`WeatherProvider`] querying a forecast HTTP API.
#[derive(Debug, Clone)]
pub struct HttpWeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpWeatherProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.darksky.net";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a provider for `base_url` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(Self::DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/forecast/{}/{latitude},{longitude}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<CloudCover, WeatherError> {
        let url = self.url(latitude, longitude);
        tracing::debug!(base_url = %self.base_url, latitude, longitude, "requesting forecast");

        let response = self
            .client
            .get(&url)
            .query(&[("exclude", "minutely,hourly,daily,alerts,flags")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: ForecastResponse = response.json().await?;
        let fraction = body
            .currently
            .and_then(|currently| currently.cloud_cover)
            .ok_or(WeatherError::MissingCloudCover)?;
        CloudCover::from_fraction(fraction).ok_or(WeatherError::OutOfRange(fraction))
    }
}

impl WeatherProvider for HttpWeatherProvider {
    async fn fetch_cloud_cover(&self, latitude: f64, longitude: f64) -> Result<CloudCover, SunswitchError> {
        Ok(self.fetch(latitude, longitude).await?)
    }
}
