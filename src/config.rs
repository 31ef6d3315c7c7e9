use serde::Deserialize;
use thiserror::Error;

use crate::predict::ObserverLocation;
use crate::search::{DEFAULT_SATELLITE, DEFAULT_TLE_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid cache ttl {0:?}: {1}")]
    InvalidTtl(String, humantime::DurationError),
}

/// Optional config file for the CLI: a fixed observer plus default query
/// parameters. Command-line flags override all of it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub observer: Option<ObserverConfig>,
    #[serde(default)]
    pub search: SearchDefaults,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    /// "lat, lon" decimal degrees.
    pub coordinates: String,
    #[serde(default)]
    pub elevation_m: f64,
}

impl ObserverConfig {
    pub fn location(&self) -> Option<ObserverLocation> {
        ObserverLocation::from_coordinates(&self.coordinates, self.elevation_m)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDefaults {
    #[serde(default = "default_satellite")]
    pub satellite: String,
    #[serde(default = "default_tle_url")]
    pub tle_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_range_days")]
    pub range_days: u32,
    #[serde(default = "default_resolution_min")]
    pub resolution_min: u32,
    #[serde(default)]
    pub min_culmination_altitude_deg: Option<f64>,
    #[serde(default)]
    pub min_above_horizon_deg: Option<f64>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            satellite: default_satellite(),
            tle_url: default_tle_url(),
            timezone: default_timezone(),
            range_days: default_range_days(),
            resolution_min: default_resolution_min(),
            min_culmination_altitude_deg: None,
            min_above_horizon_deg: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// humantime string, e.g. "2h" or "30m".
    #[serde(default = "default_ttl")]
    pub ttl: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: default_ttl() }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Result<std::time::Duration, ConfigError> {
        humantime::parse_duration(&self.ttl)
            .map_err(|e| ConfigError::InvalidTtl(self.ttl.clone(), e))
    }
}

fn default_satellite() -> String {
    DEFAULT_SATELLITE.to_string()
}
fn default_tle_url() -> String {
    DEFAULT_TLE_URL.to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_range_days() -> u32 {
    10
}
fn default_resolution_min() -> u32 {
    1
}
fn default_ttl() -> String {
    "2h".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
