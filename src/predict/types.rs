use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One look angle sample as seen by the observer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TopocentricPoint {
    pub time: DateTime<Utc>,
    /// Clockwise from true north, 0..360.
    pub azimuth_deg: f64,
    /// Above the local horizontal plane, -90..90.
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// A contiguous interval during which the satellite is above the scan horizon.
#[derive(Debug, Clone, Serialize)]
pub struct SatellitePass {
    pub satellite: String,
    pub rise: TopocentricPoint,
    pub culmination: TopocentricPoint,
    pub set: TopocentricPoint,
    /// Non-fatal irregularities hit while building this pass (window
    /// truncation, propagation gaps).
    pub anomalies: Vec<String>,
}

impl SatellitePass {
    pub fn duration(&self) -> Duration {
        self.set.time - self.rise.time
    }
}
