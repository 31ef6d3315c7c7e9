use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::predict::{AltitudeFilter, SatellitePass};

/// The query's result: ordered passes plus the parameters that produced them.
#[derive(Debug, Serialize)]
pub struct PassReport {
    pub satellite: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
    pub range_days: u32,
    pub timezone: String,
    pub filter: AltitudeFilter,
    pub passes: Vec<SatellitePass>,
}

impl PassReport {
    /// Render the pass list as a timezone-localized text block.
    ///
    /// An unrecognized timezone falls back to UTC and says so; it is never
    /// silently substituted.
    pub fn to_text(&self) -> String {
        let (tz, tz_warning) = match self.timezone.parse::<Tz>() {
            Ok(tz) => (tz, None),
            Err(_) => (Tz::UTC, Some(&self.timezone)),
        };

        let mut out = String::new();
        if let Some(unknown) = tz_warning {
            let _ = writeln!(
                out,
                "warning: unknown timezone {unknown:?}, times shown in UTC"
            );
        }

        let _ = writeln!(
            out,
            "Passes of {} over {:.5}, {:.5} for the next {} days ({} {}\u{b0}, times in {}):",
            self.satellite,
            self.latitude_deg,
            self.longitude_deg,
            self.range_days,
            self.filter,
            self.filter.threshold_deg(),
            tz,
        );

        if self.passes.is_empty() {
            let _ = writeln!(
                out,
                "No passes of {} above {}\u{b0} found in the next {} days.",
                self.satellite,
                self.filter.threshold_deg(),
                self.range_days,
            );
            return out;
        }

        for (i, pass) in self.passes.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:3}. rise {}  az {:6.1}\u{b0}",
                i + 1,
                localize(pass.rise.time, tz),
                pass.rise.azimuth_deg,
            );
            let _ = writeln!(
                out,
                "     peak {}  alt {:6.1}\u{b0}",
                localize(pass.culmination.time, tz),
                pass.culmination.elevation_deg,
            );
            let _ = writeln!(
                out,
                "     set  {}  az {:6.1}\u{b0}",
                localize(pass.set.time, tz),
                pass.set.azimuth_deg,
            );
            let seconds = pass.duration().num_seconds().max(0) as u64;
            let _ = writeln!(
                out,
                "     duration {}",
                humantime::format_duration(std::time::Duration::from_secs(seconds)),
            );
            for note in &pass.anomalies {
                let _ = writeln!(out, "     note: {note}");
            }
        }
        out
    }
}

fn localize(time: DateTime<Utc>, tz: Tz) -> String {
    time.with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}
