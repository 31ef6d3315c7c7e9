mod error;
mod filter;
mod observer;
mod pass_finder;
mod propagation;
mod types;

pub use error::PredictError;
pub use filter::{filter_passes, AltitudeFilter};
pub use observer::ObserverLocation;
pub use pass_finder::{find_passes, PassScanner, ScanConfig};
pub use propagation::{observe, propagate, to_topocentric, EciState};
pub use types::{SatellitePass, TopocentricPoint};
