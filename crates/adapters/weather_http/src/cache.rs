//! JSON file cache for the last weather reading.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sunswitch_app::ports::{CachedWeather, WeatherCache};
use sunswitch_domain::error::SunswitchError;
use sunswitch_domain::location::CloudCover;
use sunswitch_domain::time::Timestamp;

use crate::error::WeatherError;

/// On-disk representation: `{ "cloud_cover": 40, "fetched_at": "<RFC 3339>" }`.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    cloud_cover: CloudCover,
    fetched_at: Timestamp,
}

/// [`WeatherCache`] stored as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileWeatherCache {
    path: PathBuf,
}

impl FileWeatherCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<CachedWeather>, WeatherError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record: CacheRecord = serde_json::from_str(&content)?;
        Ok(Some(CachedWeather {
            cloud_cover: record.cloud_cover,
            fetched_at: record.fetched_at,
        }))
    }

    fn write(&self, reading: &CachedWeather) -> Result<(), WeatherError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let record = CacheRecord {
            cloud_cover: reading.cloud_cover,
            fetched_at: reading.fetched_at,
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, &record)?;
        file.write_all(b"\n")?;
        file.persist(&self.path)?;
        Ok(())
    }
}

impl WeatherCache for FileWeatherCache {
    fn load(&self) -> Result<Option<CachedWeather>, SunswitchError> {
        Ok(self.read()?)
    }

    fn store(&self, reading: &CachedWeather) -> Result<(), SunswitchError> {
        self.write(reading)?;
        tracing::debug!(path = %self.path.display(), cloud_cover = %reading.cloud_cover, "weather cached");
        Ok(())
    }
}
