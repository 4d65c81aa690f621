//! Configuration loading: TOML file with environment variable overrides.
//!
//! Reads `sunswitch.toml` from the working directory, or the file named by
//! `SUNSWITCH_CONFIG`. Every section except the devices has a sensible
//! default. Environment variables take precedence over file values.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use sunswitch_app::services::reconciler::FadeSettings;
use sunswitch_domain::device::{DeviceKind, DeviceSpec, normalize_name};
use sunswitch_domain::location::Location;
use sunswitch_domain::rule::RuleSpec;

const DEFAULT_PATH: &str = "sunswitch.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone the rules are written in.
    pub timezone: String,
    /// Forecast API key. Weather adjustments are disabled without one.
    pub weather_api_key: Option<String>,
    /// Evaluate and log only.
    pub dry_run: bool,
    /// Required as soon as a rule follows sunrise or sunset.
    pub location: Option<LocationConfig>,
    pub driver: DriverConfig,
    pub weather: WeatherConfig,
    pub ledger: LedgerConfig,
    pub change_log: ChangeLogConfig,
    pub logging: LoggingConfig,
    pub fade: FadeConfig,
    /// Override-tracked on/off devices, by name.
    pub switches: BTreeMap<String, DeviceConfig>,
    /// Dimmable devices, by name.
    pub lights: BTreeMap<String, DeviceConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationConfig {
    pub lat: f64,
    pub long: f64,
}

/// Which device driver to start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Tasmota,
    Virtual,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub kind: DriverKind,
    pub discovery_timeout_secs: u64,
    /// Tasmota hosts to probe.
    pub hosts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub cache_path: PathBuf,
    pub max_age_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChangeLogConfig {
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub settle_secs: u64,
    pub transition_ms: u64,
}

/// Rules of one device.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl Config {
    /// Load configuration from `SUNSWITCH_CONFIG` or `sunswitch.toml` (if
    /// present), apply environment-variable overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, a rule is
    /// invalid, or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SUNSWITCH_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on syntax errors and invalid rules.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SUNSWITCH_LEDGER") {
            self.ledger.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("SUNSWITCH_WEATHER_API_KEY") {
            self.weather_api_key = Some(val);
        }
        if let Ok(val) = std::env::var("SUNSWITCH_DRY_RUN") {
            self.dry_run = matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("SUNSWITCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.location()?;
        if self.location.is_none() && self.follows_the_sun() {
            return Err(ConfigError::Validation(
                "rules follow sunrise or sunset but `[location]` is missing".to_string(),
            ));
        }
        if self.driver.kind == DriverKind::Tasmota && self.driver.hosts.is_empty() && self.has_devices() {
            return Err(ConfigError::Validation(
                "the tasmota driver needs at least one entry in `driver.hosts`".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in self.switches.keys().chain(self.lights.keys()) {
            if !seen.insert(normalize_name(name)) {
                return Err(ConfigError::Validation(format!(
                    "device `{name}` is declared more than once"
                )));
            }
        }
        Ok(())
    }

    fn follows_the_sun(&self) -> bool {
        self.switches
            .values()
            .chain(self.lights.values())
            .flat_map(|device| &device.rules)
            .any(|rule| !rule.on.is_exact() || !rule.off.is_exact())
    }

    fn has_devices(&self) -> bool {
        !self.switches.is_empty() || !self.lights.is_empty()
    }

    /// Timezone and coordinates of the installation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown timezone and
    /// [`ConfigError::Domain`] for out-of-range coordinates.
    pub fn location(&self) -> Result<Location, ConfigError> {
        let timezone = Tz::from_str(&self.timezone)
            .map_err(|err| ConfigError::Validation(format!("unknown timezone `{}`: {err}", self.timezone)))?;
        let (lat, long) = self
            .location
            .map_or((0.0, 0.0), |location| (location.lat, location.long));
        Ok(Location::new(timezone, lat, long)?)
    }

    /// Every configured device, switches first.
    #[must_use]
    pub fn device_specs(&self) -> Vec<DeviceSpec> {
        let switches = self
            .switches
            .iter()
            .map(|(name, device)| DeviceSpec::new(name.as_str(), DeviceKind::Switch, device.rules.clone()));
        let lights = self
            .lights
            .iter()
            .map(|(name, device)| DeviceSpec::new(name.as_str(), DeviceKind::Light, device.rules.clone()));
        switches.chain(lights).collect()
    }

    #[must_use]
    pub fn fade_settings(&self) -> FadeSettings {
        FadeSettings {
            transition: Duration::from_millis(self.fade.transition_ms),
            settle: Duration::from_secs(self.fade.settle_secs),
        }
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.driver.discovery_timeout_secs)
    }

    #[must_use]
    pub fn weather_max_age(&self) -> chrono::Duration {
        i64::try_from(self.weather.max_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// API key, unless missing or blank.
    #[must_use]
    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            weather_api_key: None,
            dry_run: false,
            location: None,
            driver: DriverConfig::default(),
            weather: WeatherConfig::default(),
            ledger: LedgerConfig::default(),
            change_log: ChangeLogConfig::default(),
            logging: LoggingConfig::default(),
            fade: FadeConfig::default(),
            switches: BTreeMap::new(),
            lights: BTreeMap::new(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            kind: DriverKind::default(),
            discovery_timeout_secs: 10,
            hosts: Vec::new(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.darksky.net".to_string(),
            cache_path: PathBuf::from("weather.json"),
            max_age_secs: 3600,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ledger.json"),
        }
    }
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("changes.log"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sunswitch=info,sunswitch_app=info,sunswitch_adapter_tasmota_http=info".to_string(),
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            settle_secs: 30,
            transition_ms: 10_000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure, including invalid rules.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Domain validation failure.
    #[error("invalid configuration")]
    Domain(#[from] sunswitch_domain::error::ConfigError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
