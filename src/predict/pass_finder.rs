use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::observer::ObserverLocation;
use crate::predict::propagation::observe;
use crate::predict::types::{SatellitePass, TopocentricPoint};

/// Rise/set refinement converges below this interval width.
const CROSSING_TOLERANCE_MS: i64 = 100;
/// Culmination refinement converges below this interval width.
const CULMINATION_TOLERANCE_MS: i64 = 500;

const GOLDEN_RATIO: f64 = 0.618_033_988_749_895;

/// Tunables for a single pass scan.
///
/// `resolution_min` trades scan cost against the shortest pass the coarse
/// sweep can catch; refinement recovers sub-second timing either way.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub resolution_min: u32,
    /// Elevation that counts as "visible". 0 for the true horizon; the
    /// above-horizon filter mode raises it.
    pub horizon_deg: f64,
    /// Wall-clock budget for the whole scan.
    pub budget: Option<std::time::Duration>,
    /// On a blown budget, return the passes found so far instead of failing.
    pub partial_on_timeout: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            resolution_min: 1,
            horizon_deg: 0.0,
            budget: None,
            partial_on_timeout: false,
        }
    }
}

struct OpenPass {
    rise: TopocentricPoint,
    coarse_max: TopocentricPoint,
    anomalies: Vec<String>,
}

/// Lazy scan of one window for one satellite.
///
/// Coarse samples at the configured resolution, opens a candidate pass on each
/// rising edge and yields it once the trailing edge is refined. Failing
/// samples mid-scan count as below horizon and are annotated on the affected
/// pass; a failure at the very first sample aborts construction.
pub struct PassScanner<'a> {
    observer: &'a ObserverLocation,
    elements: &'a Elements,
    constants: &'a Constants,
    satellite: String,
    config: ScanConfig,
    window_end: DateTime<Utc>,
    step: Duration,
    cursor: DateTime<Utc>,
    prev_time: DateTime<Utc>,
    prev_visible: bool,
    open: Option<OpenPass>,
    started: Instant,
    done: bool,
}

impl<'a> PassScanner<'a> {
    pub fn start(
        observer: &'a ObserverLocation,
        elements: &'a Elements,
        constants: &'a Constants,
        satellite: &str,
        window_start: DateTime<Utc>,
        window_days: u32,
        config: ScanConfig,
    ) -> Result<Self, PredictError> {
        let step = Duration::minutes(i64::from(config.resolution_min.max(1)));
        let window_end = window_start + Duration::days(i64::from(window_days));

        // A failure at the requested epoch itself aborts the whole query.
        let first = observe(observer, elements, constants, window_start)?;
        let visible = first.elevation_deg >= config.horizon_deg;

        let open = if visible {
            // Already up at the window edge: clamp rise instead of
            // extrapolating outside the window.
            Some(OpenPass {
                rise: first,
                coarse_max: first,
                anomalies: vec![format!("pass already in progress at window start {window_start}")],
            })
        } else {
            None
        };

        Ok(Self {
            observer,
            elements,
            constants,
            satellite: satellite.to_string(),
            config,
            window_end,
            step,
            cursor: window_start + step,
            prev_time: window_start,
            prev_visible: visible,
            open,
            started: Instant::now(),
            done: false,
        })
    }

    /// Advance the scan until the next completed pass or the window end.
    pub fn next_pass(&mut self) -> Result<Option<SatellitePass>, PredictError> {
        if self.done {
            return Ok(None);
        }

        while self.cursor <= self.window_end {
            self.check_budget()?;

            let sample_time = self.cursor;
            self.cursor += self.step;

            let (sample, visible) =
                match observe(self.observer, self.elements, self.constants, sample_time) {
                    Ok(sample) => (Some(sample), sample.elevation_deg >= self.config.horizon_deg),
                    Err(e) => {
                        log::warn!("{}: {e}; sample treated as below horizon", self.satellite);
                        if let Some(open) = self.open.as_mut() {
                            open.anomalies.push(format!("{e}; sample treated as below horizon"));
                        }
                        (None, false)
                    }
                };

            let result = match (self.prev_visible, visible) {
                (false, true) => {
                    if let Some(sample) = sample {
                        let (rise, anomalies) =
                            match self.refine_crossing(self.prev_time, sample_time, true) {
                                Ok(point) => (point, Vec::new()),
                                Err(e) => (
                                    sample,
                                    vec![format!("{e}; rise taken at the first visible sample")],
                                ),
                            };
                        self.open = Some(OpenPass {
                            rise,
                            coarse_max: sample,
                            anomalies,
                        });
                    }
                    None
                }
                (true, true) => {
                    if let (Some(open), Some(sample)) = (self.open.as_mut(), sample) {
                        if sample.elevation_deg > open.coarse_max.elevation_deg {
                            open.coarse_max = sample;
                        }
                    }
                    None
                }
                (true, false) => self
                    .open
                    .take()
                    .map(|open| self.close_pass(open, self.prev_time, sample_time)),
                (false, false) => None,
            };

            self.prev_time = sample_time;
            self.prev_visible = visible;

            if let Some(pass) = result {
                return Ok(Some(pass));
            }
        }

        self.done = true;

        match self.open.take() {
            Some(mut open) => {
                let set = match observe(
                    self.observer,
                    self.elements,
                    self.constants,
                    self.window_end,
                ) {
                    // Still up at the window edge: clamp set to the boundary
                    // instead of extrapolating outside it.
                    Ok(sample) if sample.elevation_deg >= self.config.horizon_deg => {
                        open.anomalies
                            .push(format!("pass truncated at window end {}", self.window_end));
                        sample
                    }
                    // Set fell between the last coarse sample and the window
                    // end; refine it like any other trailing edge.
                    Ok(_) => match self.refine_crossing(self.prev_time, self.window_end, false) {
                        Ok(point) => point,
                        Err(e) => {
                            open.anomalies.push(format!(
                                "{e}; set geometry taken from the last good sample"
                            ));
                            TopocentricPoint {
                                time: self.prev_time,
                                ..open.coarse_max
                            }
                        }
                    },
                    Err(e) => {
                        open.anomalies
                            .push(format!("{e}; set geometry taken from the last good sample"));
                        open.anomalies
                            .push(format!("pass truncated at window end {}", self.window_end));
                        TopocentricPoint {
                            time: self.window_end,
                            ..open.coarse_max
                        }
                    }
                };
                Ok(Some(self.build_pass(open, set)))
            }
            None => Ok(None),
        }
    }

    fn check_budget(&self) -> Result<(), PredictError> {
        if let Some(budget) = self.config.budget {
            let elapsed = self.started.elapsed();
            if elapsed > budget {
                return Err(PredictError::TimedOut { budget, elapsed });
            }
        }
        Ok(())
    }

    fn close_pass(
        &self,
        mut open: OpenPass,
        last_visible: DateTime<Utc>,
        first_invisible: DateTime<Utc>,
    ) -> SatellitePass {
        let set = match self.refine_crossing(last_visible, first_invisible, false) {
            Ok(point) => point,
            Err(e) => {
                open.anomalies
                    .push(format!("{e}; set geometry taken from the last good sample"));
                TopocentricPoint {
                    time: last_visible,
                    ..open.coarse_max
                }
            }
        };
        self.build_pass(open, set)
    }

    fn build_pass(&self, open: OpenPass, set: TopocentricPoint) -> SatellitePass {
        let culmination = self.refine_culmination(open.rise, set, open.coarse_max);
        SatellitePass {
            satellite: self.satellite.clone(),
            rise: open.rise,
            culmination,
            set,
            anomalies: open.anomalies,
        }
    }

    /// Bisect the horizon crossing between a below and an above sample.
    fn refine_crossing(
        &self,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
        rising: bool,
    ) -> Result<TopocentricPoint, PredictError> {
        let mut low = before;
        let mut high = after;

        while (high - low) > Duration::milliseconds(CROSSING_TOLERANCE_MS) {
            let mid = low + (high - low) / 2;
            let sample = observe(self.observer, self.elements, self.constants, mid)?;
            let above = sample.elevation_deg >= self.config.horizon_deg;
            if above == rising {
                high = mid;
            } else {
                low = mid;
            }
        }

        // Land on the above-horizon side of the crossing so the closed
        // [rise, set] interval never dips below the scan horizon.
        let crossing = if rising { high } else { low };
        observe(self.observer, self.elements, self.constants, crossing)
    }

    /// Golden-section search for the elevation maximum inside [rise, set].
    ///
    /// Elevation is unimodal within one pass for near-circular orbits; for
    /// irregular orbits the coarse maximum is kept as a floor.
    fn refine_culmination(
        &self,
        rise: TopocentricPoint,
        set: TopocentricPoint,
        coarse_max: TopocentricPoint,
    ) -> TopocentricPoint {
        let span_ms = (set.time - rise.time).num_milliseconds();
        if span_ms <= 2 * CULMINATION_TOLERANCE_MS {
            return self.midpoint_fallback(rise, set, coarse_max);
        }

        let at = |offset_ms: f64| rise.time + Duration::milliseconds(offset_ms.round() as i64);
        let sample_at = |offset_ms: f64| {
            observe(self.observer, self.elements, self.constants, at(offset_ms)).ok()
        };

        let mut lo = 0.0;
        let mut hi = span_ms as f64;
        let mut a = hi - GOLDEN_RATIO * (hi - lo);
        let mut b = lo + GOLDEN_RATIO * (hi - lo);
        let (mut fa, mut fb) = match (sample_at(a), sample_at(b)) {
            (Some(fa), Some(fb)) => (fa, fb),
            _ => return self.midpoint_fallback(rise, set, coarse_max),
        };

        while hi - lo > CULMINATION_TOLERANCE_MS as f64 {
            if fa.elevation_deg >= fb.elevation_deg {
                hi = b;
                b = a;
                fb = fa;
                a = hi - GOLDEN_RATIO * (hi - lo);
                fa = match sample_at(a) {
                    Some(f) => f,
                    None => return self.midpoint_fallback(rise, set, coarse_max),
                };
            } else {
                lo = a;
                a = b;
                fa = fb;
                b = lo + GOLDEN_RATIO * (hi - lo);
                fb = match sample_at(b) {
                    Some(f) => f,
                    None => return self.midpoint_fallback(rise, set, coarse_max),
                };
            }
        }

        let mut best = if fa.elevation_deg >= fb.elevation_deg { fa } else { fb };
        // The coarse sweep may have seen a higher sample than the search
        // bracket converged on.
        if coarse_max.elevation_deg > best.elevation_deg
            && coarse_max.time > rise.time
            && coarse_max.time < set.time
        {
            best = coarse_max;
        }
        best
    }

    fn midpoint_fallback(
        &self,
        rise: TopocentricPoint,
        set: TopocentricPoint,
        coarse_max: TopocentricPoint,
    ) -> TopocentricPoint {
        if coarse_max.time > rise.time && coarse_max.time < set.time {
            return coarse_max;
        }
        let mid = rise.time + (set.time - rise.time) / 2;
        observe(self.observer, self.elements, self.constants, mid).unwrap_or(TopocentricPoint {
            time: mid,
            ..coarse_max
        })
    }
}

impl Iterator for PassScanner<'_> {
    type Item = Result<SatellitePass, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_pass() {
            Ok(Some(pass)) => Some(Ok(pass)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan a window and collect every pass, ordered by rise time.
pub fn find_passes(
    observer: &ObserverLocation,
    elements: &Elements,
    constants: &Constants,
    satellite: &str,
    window_start: DateTime<Utc>,
    window_days: u32,
    config: ScanConfig,
) -> Result<Vec<SatellitePass>, PredictError> {
    let partial_on_timeout = config.partial_on_timeout;
    let mut scanner = PassScanner::start(
        observer,
        elements,
        constants,
        satellite,
        window_start,
        window_days,
        config,
    )?;

    let mut passes = Vec::new();
    loop {
        match scanner.next_pass() {
            Ok(Some(pass)) => passes.push(pass),
            Ok(None) => break,
            Err(e @ PredictError::TimedOut { .. }) if partial_on_timeout => {
                log::warn!("{satellite}: {e}; returning {} partial passes", passes.len());
                break;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(passes)
}
