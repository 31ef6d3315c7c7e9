use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::predict::types::SatellitePass;

/// The two altitude-threshold semantics callers ask for.
///
/// `MinCulmination` scans against the true horizon and drops passes that
/// never climb to the threshold. `MinAboveHorizon` raises the scan horizon
/// itself, so rise and set mark the crossings of the threshold elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeFilter {
    #[strum(serialize = "minimum culmination altitude")]
    MinCulmination(f64),
    #[strum(serialize = "minimum above-horizon altitude")]
    MinAboveHorizon(f64),
}

impl Default for AltitudeFilter {
    fn default() -> Self {
        AltitudeFilter::MinCulmination(15.0)
    }
}

impl AltitudeFilter {
    pub fn threshold_deg(&self) -> f64 {
        match *self {
            AltitudeFilter::MinCulmination(t) | AltitudeFilter::MinAboveHorizon(t) => t,
        }
    }

    /// Elevation the pass scan should treat as "visible".
    pub fn horizon_deg(&self) -> f64 {
        match *self {
            AltitudeFilter::MinCulmination(_) => 0.0,
            AltitudeFilter::MinAboveHorizon(t) => t,
        }
    }

    pub fn retains(&self, pass: &SatellitePass) -> bool {
        match *self {
            AltitudeFilter::MinCulmination(t) => pass.culmination.elevation_deg >= t,
            // Already enforced by the raised scan horizon.
            AltitudeFilter::MinAboveHorizon(_) => true,
        }
    }
}

/// Drop passes failing the threshold; order and relative sequence are kept.
pub fn filter_passes(mut passes: Vec<SatellitePass>, filter: AltitudeFilter) -> Vec<SatellitePass> {
    passes.retain(|pass| filter.retains(pass));
    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::types::TopocentricPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn pass(offset_min: i64, culmination_deg: f64) -> SatellitePass {
        let rise_time = Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap()
            + Duration::minutes(offset_min);
        let point = |minutes: i64, elevation_deg: f64, azimuth_deg: f64| TopocentricPoint {
            time: rise_time + Duration::minutes(minutes),
            azimuth_deg,
            elevation_deg,
            range_km: 1000.0,
        };
        SatellitePass {
            satellite: "ISS (ZARYA)".into(),
            rise: point(0, 0.0, 310.0),
            culmination: point(5, culmination_deg, 20.0),
            set: point(10, 0.0, 120.0),
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn zero_threshold_is_a_no_op() {
        let passes = vec![pass(0, 3.0), pass(120, 45.0)];
        let kept = filter_passes(passes.clone(), AltitudeFilter::MinCulmination(0.0));
        assert_eq!(kept.len(), passes.len());
    }

    #[test]
    fn culmination_filter_keeps_an_ordered_subsequence() {
        let passes = vec![pass(0, 3.0), pass(120, 45.0), pass(240, 14.9), pass(360, 15.0)];
        let kept = filter_passes(passes, AltitudeFilter::MinCulmination(15.0));
        assert_eq!(kept.len(), 2);
        assert!(kept[0].rise.time < kept[1].rise.time);
        assert!(kept.iter().all(|p| p.culmination.elevation_deg >= 15.0));
    }

    #[test]
    fn zenith_threshold_rejects_every_real_pass() {
        let passes = vec![pass(0, 89.9), pass(120, 45.0)];
        let kept = filter_passes(passes, AltitudeFilter::MinCulmination(90.0));
        assert!(kept.is_empty());
    }

    #[test]
    fn above_horizon_mode_defers_to_the_scan() {
        let passes = vec![pass(0, 3.0)];
        let kept = filter_passes(passes, AltitudeFilter::MinAboveHorizon(10.0));
        assert_eq!(kept.len(), 1);
        assert_eq!(AltitudeFilter::MinAboveHorizon(10.0).horizon_deg(), 10.0);
        assert_eq!(AltitudeFilter::MinCulmination(10.0).horizon_deg(), 0.0);
    }

    #[test]
    fn filter_modes_have_readable_names() {
        assert_eq!(
            AltitudeFilter::MinCulmination(15.0).to_string(),
            "minimum culmination altitude"
        );
        assert_eq!(
            AltitudeFilter::MinAboveHorizon(1.0).to_string(),
            "minimum above-horizon altitude"
        );
    }
}
