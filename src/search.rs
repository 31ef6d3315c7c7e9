use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, TleSource};
use crate::predict::{
    filter_passes, find_passes, AltitudeFilter, ObserverLocation, PredictError, ScanConfig,
};
use crate::report::PassReport;

pub const DEFAULT_TLE_URL: &str = "https://celestrak.org/NORAD/elements/stations.txt";
pub const DEFAULT_SATELLITE: &str = "ISS (ZARYA)";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid value {value:?} for {field}: {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// A structured pass-search request, as handed over by an orchestration
/// layer. Optional fields carry documented defaults; lat and lon never do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_satellite")]
    pub satellite_name: String,
    #[serde(default = "default_range_days")]
    pub range_days: u32,
    #[serde(default = "default_tle_url")]
    pub tle_url: String,
    #[serde(default = "default_timezone")]
    pub timezone_name: String,
    #[serde(default = "default_elevation_m")]
    pub elevation_m: f64,
    #[serde(default = "default_resolution_min")]
    pub resolution_min: u32,
    /// Drop passes culminating below this altitude. Mutually exclusive with
    /// `min_above_horizon_deg`; when neither is given, 15 applies.
    #[serde(default)]
    pub min_culmination_altitude_deg: Option<f64>,
    /// Count the satellite as risen only above this altitude.
    #[serde(default)]
    pub min_above_horizon_deg: Option<f64>,
    /// Wall-clock budget for the scan, in milliseconds.
    #[serde(default)]
    pub scan_budget_ms: Option<u64>,
    /// On a blown budget, report the passes found so far instead of failing.
    #[serde(default)]
    pub partial_on_timeout: bool,
}

fn default_satellite() -> String {
    DEFAULT_SATELLITE.to_string()
}
fn default_range_days() -> u32 {
    10
}
fn default_tle_url() -> String {
    DEFAULT_TLE_URL.to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_elevation_m() -> f64 {
    200.0
}
fn default_resolution_min() -> u32 {
    1
}

impl SearchQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            satellite_name: default_satellite(),
            range_days: default_range_days(),
            tle_url: default_tle_url(),
            timezone_name: default_timezone(),
            elevation_m: default_elevation_m(),
            resolution_min: default_resolution_min(),
            min_culmination_altitude_deg: None,
            min_above_horizon_deg: None,
            scan_budget_ms: None,
            partial_on_timeout: false,
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |field: &'static str, value: String, reason: &'static str| {
            Err(SearchError::Validation {
                field,
                value,
                reason,
            })
        };

        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return invalid("lat", self.lat.to_string(), "must be within -90..90");
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return invalid("lon", self.lon.to_string(), "must be within -180..180");
        }
        if self.satellite_name.trim().is_empty() {
            return invalid(
                "satellite_name",
                self.satellite_name.clone(),
                "must not be empty",
            );
        }
        if self.range_days < 1 {
            return invalid(
                "range_days",
                self.range_days.to_string(),
                "must be at least 1",
            );
        }
        if self.resolution_min < 1 {
            return invalid(
                "resolution_min",
                self.resolution_min.to_string(),
                "must be at least 1",
            );
        }
        if self.min_culmination_altitude_deg.is_some() && self.min_above_horizon_deg.is_some() {
            return invalid(
                "min_above_horizon_deg",
                format!("{:?}", self.min_above_horizon_deg),
                "mutually exclusive with min_culmination_altitude_deg",
            );
        }
        if let Some(t) = self.min_culmination_altitude_deg {
            if !t.is_finite() || !(0.0..=90.0).contains(&t) {
                return invalid(
                    "min_culmination_altitude_deg",
                    t.to_string(),
                    "must be within 0..90",
                );
            }
        }
        if let Some(t) = self.min_above_horizon_deg {
            if !t.is_finite() || !(0.0..=90.0).contains(&t) {
                return invalid(
                    "min_above_horizon_deg",
                    t.to_string(),
                    "must be within 0..90",
                );
            }
        }
        Ok(())
    }

    pub fn altitude_filter(&self) -> AltitudeFilter {
        match (self.min_culmination_altitude_deg, self.min_above_horizon_deg) {
            (_, Some(t)) => AltitudeFilter::MinAboveHorizon(t),
            (Some(t), None) => AltitudeFilter::MinCulmination(t),
            (None, None) => AltitudeFilter::default(),
        }
    }

    fn scan_config(&self, filter: AltitudeFilter) -> ScanConfig {
        ScanConfig {
            resolution_min: self.resolution_min,
            horizon_deg: filter.horizon_deg(),
            budget: self.scan_budget_ms.map(std::time::Duration::from_millis),
            partial_on_timeout: self.partial_on_timeout,
        }
    }
}

/// The full query pipeline: fetch and select elements, scan the window,
/// filter and package the passes. The element fetch is its only await point;
/// the scan itself runs synchronously.
pub struct SatelliteSearch {
    source: TleSource,
}

impl SatelliteSearch {
    pub fn new(source: TleSource) -> Self {
        Self { source }
    }

    /// Default catalog cache of a few hours; rapid repeated queries reuse the
    /// fetched text.
    pub fn with_default_cache() -> Self {
        Self::new(TleSource::with_cache_ttl(std::time::Duration::from_secs(
            2 * 3600,
        )))
    }

    /// Search a window starting now.
    pub async fn run(&self, query: &SearchQuery) -> Result<PassReport, SearchError> {
        self.run_at(query, Utc::now()).await
    }

    /// Search a window anchored at an explicit start instant.
    pub async fn run_at(
        &self,
        query: &SearchQuery,
        window_start: DateTime<Utc>,
    ) -> Result<PassReport, SearchError> {
        query.validate()?;
        let filter = query.altitude_filter();

        log::info!(
            "searching {} passes for {:.5}, {:.5} over {} days ({} {})",
            query.satellite_name,
            query.lat,
            query.lon,
            query.range_days,
            filter,
            filter.threshold_deg(),
        );

        let catalog = self.source.fetch_catalog(&query.tle_url).await?;
        let entry = catalog.select(&query.satellite_name)?;
        let observer = ObserverLocation::new(query.lat, query.lon, query.elevation_m);

        let passes = find_passes(
            &observer,
            &entry.elements,
            &entry.constants,
            &entry.name,
            window_start,
            query.range_days,
            query.scan_config(filter),
        )?;
        let passes = filter_passes(passes, filter);
        log::info!("{}: {} passes retained", entry.name, passes.len());

        Ok(PassReport {
            satellite: entry.name.clone(),
            latitude_deg: query.lat,
            longitude_deg: query.lon,
            elevation_m: query.elevation_m,
            range_days: query.range_days,
            timezone: query.timezone_name.clone(),
            filter,
            passes,
        })
    }

    /// Convenience for callers that only want the rendered text block.
    pub async fn run_text(&self, query: &SearchQuery) -> Result<String, SearchError> {
        Ok(self.run(query).await?.to_text())
    }
}
