use serde::{Deserialize, Serialize};

/// Geodetic observer position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        }
    }

    /// Parse a "lat, lon" coordinate string as used in config files.
    pub fn from_coordinates(coordinates: &str, elevation_m: f64) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Some(Self::new(lat, lon, elevation_m))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        // WGS-84 constants
        let a = 6378.137;
        let e2 = 0.00669437999014;
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let elev_km = self.elevation_m / 1000.0;
        let x = (n + elev_km) * cos_lat * lon.cos();
        let y = (n + elev_km) * cos_lat * lon.sin();
        let z = (n * (1.0 - e2) + elev_km) * sin_lat;
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse() {
        let obs = ObserverLocation::from_coordinates("50.06143, 19.93658", 200.0).unwrap();
        assert!((obs.latitude_deg - 50.06143).abs() < 1e-9);
        assert!((obs.longitude_deg - 19.93658).abs() < 1e-9);
        assert!(ObserverLocation::from_coordinates("50.06143", 0.0).is_none());
        assert!(ObserverLocation::from_coordinates("a, b", 0.0).is_none());
    }

    #[test]
    fn ecef_radius_is_close_to_earth_radius() {
        let obs = ObserverLocation::new(50.06143, 19.93658, 200.0);
        let [x, y, z] = obs.position_ecef_km();
        let r = (x * x + y * y + z * z).sqrt();
        assert!(r > 6350.0 && r < 6400.0, "radius {r}");
    }

    #[test]
    fn polar_observer_is_on_the_axis() {
        let obs = ObserverLocation::new(90.0, 0.0, 0.0);
        let [x, y, z] = obs.position_ecef_km();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        // polar radius of the ellipsoid
        assert!((z - 6356.752).abs() < 0.01, "z {z}");
    }
}
