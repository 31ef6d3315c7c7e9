use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::observer::ObserverLocation;
use crate::predict::types::TopocentricPoint;

/// Satellite state in the TEME inertial frame.
#[derive(Debug, Clone, Copy)]
pub struct EciState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Propagate the element set to `at` with SGP4.
///
/// Deterministic for identical inputs. Fails if the model breaks down at the
/// requested instant (decayed orbit, undefined semi-major axis).
pub fn propagate(
    elements: &Elements,
    constants: &Constants,
    at: DateTime<Utc>,
) -> Result<EciState, PredictError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&at.naive_utc())
        .map_err(|e| PredictError::Propagation {
            at,
            message: e.to_string(),
        })?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| PredictError::Propagation {
            at,
            message: e.to_string(),
        })?;

    Ok(EciState {
        position_km: prediction.position,
        velocity_km_s: prediction.velocity,
    })
}

/// Convert an inertial-frame position into the observer's horizon frame.
///
/// Rotates TEME into ECEF using GMST at `at`, then projects the observer-to-
/// satellite vector onto the local east/north/up axes.
pub fn to_topocentric(
    position_km: [f64; 3],
    at: DateTime<Utc>,
    observer: &ObserverLocation,
) -> TopocentricPoint {
    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()));

    let sat_ecef = teme_to_ecef(position_km, sidereal);
    let obs_ecef = observer.position_ecef_km();

    let dr = [
        sat_ecef[0] - obs_ecef[0],
        sat_ecef[1] - obs_ecef[1],
        sat_ecef[2] - obs_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    TopocentricPoint {
        time: at,
        azimuth_deg,
        elevation_deg,
        range_km,
    }
}

/// Propagate and transform in one step.
pub fn observe(
    observer: &ObserverLocation,
    elements: &Elements,
    constants: &Constants,
    at: DateTime<Utc>,
) -> Result<TopocentricPoint, PredictError> {
    let state = propagate(elements, constants, at)?;
    Ok(to_topocentric(state.position_km, at, observer))
}

fn teme_to_ecef(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use chrono::Duration;

    fn iss() -> Catalog {
        Catalog::parse(crate::catalog::test_fixtures::ISS_CATALOG).unwrap()
    }

    #[test]
    fn propagation_is_deterministic() {
        let catalog = iss();
        let entry = catalog.select("ISS (ZARYA)").unwrap();
        let at = entry.epoch() + Duration::hours(3);

        let a = propagate(&entry.elements, &entry.constants, at).unwrap();
        let b = propagate(&entry.elements, &entry.constants, at).unwrap();
        assert_eq!(a.position_km, b.position_km);
        assert_eq!(a.velocity_km_s, b.velocity_km_s);
    }

    #[test]
    fn propagated_state_is_in_low_earth_orbit() {
        let catalog = iss();
        let entry = catalog.select("ISS (ZARYA)").unwrap();
        let state = propagate(&entry.elements, &entry.constants, entry.epoch()).unwrap();

        let [x, y, z] = state.position_km;
        let r = (x * x + y * y + z * z).sqrt();
        assert!(r > 6500.0 && r < 7100.0, "geocentric radius {r}");

        let [vx, vy, vz] = state.velocity_km_s;
        let v = (vx * vx + vy * vy + vz * vz).sqrt();
        assert!(v > 7.0 && v < 8.2, "speed {v}");
    }

    #[test]
    fn look_angles_are_in_range() {
        let catalog = iss();
        let entry = catalog.select("ISS (ZARYA)").unwrap();
        let observer = ObserverLocation::new(50.06143, 19.93658, 200.0);

        for hour in 0..24 {
            let at = entry.epoch() + Duration::hours(hour);
            let point = observe(&observer, &entry.elements, &entry.constants, at).unwrap();
            assert!((0.0..=360.0).contains(&point.azimuth_deg), "{point:?}");
            assert!((-90.0..=90.0).contains(&point.elevation_deg), "{point:?}");
            assert!(point.range_km > 300.0 && point.range_km < 15000.0, "{point:?}");
        }
    }

    #[test]
    fn overhead_satellite_has_high_elevation() {
        // Place the satellite straight above the observer by construction.
        let observer = ObserverLocation::new(50.0, 20.0, 0.0);
        let at = chrono::DateTime::parse_from_rfc3339("2008-09-20T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()));
        let [x, y, z] = observer.position_ecef_km();
        let scale = 1.1;
        // Undo the TEME->ECEF rotation so to_topocentric lands back above the observer.
        let teme = [
            scale * (x * sidereal.cos() - y * sidereal.sin()),
            scale * (x * sidereal.sin() + y * sidereal.cos()),
            scale * z,
        ];

        let point = to_topocentric(teme, at, &observer);
        // Geodetic vs geocentric latitude keeps this a little off zenith.
        assert!(point.elevation_deg > 85.0, "{point:?}");
    }
}
