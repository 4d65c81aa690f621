//! Weather adapter error type.

use sunswitch_domain::error::SunswitchError;

/// Errors raised while fetching or caching weather data.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The request could not be sent or its body read.
    #[error("weather request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("weather API returned HTTP {0}")]
    Status(u16),

    /// The payload has no `currently.cloudCover` value.
    #[error("weather response has no cloud cover")]
    MissingCloudCover,

    /// The cloud cover is not a fraction between 0 and 1.
    #[error("cloud cover {0} is out of range")]
    OutOfRange(f64),

    #[error("weather cache I/O error")]
    Io(#[from] std::io::Error),

    #[error("weather cache is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("unable to replace weather cache")]
    Persist(#[from] tempfile::PersistError),
}

impl From<WeatherError> for SunswitchError {
    fn from(err: WeatherError) -> Self {
        Self::WeatherFetch(Box::new(err))
    }
}
