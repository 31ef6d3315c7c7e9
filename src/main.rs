use clap::Parser;
use std::process::ExitCode;

use satwatch::catalog::TleSource;
use satwatch::config::Config;
use satwatch::{SatelliteSearch, SearchQuery};

#[derive(Parser)]
#[command(name = "satwatch")]
#[command(about = "Predict satellite passes over an observer location")]
struct Cli {
    /// Observer latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Observer longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Observer elevation above sea level in meters
    #[arg(long)]
    elevation_m: Option<f64>,
    /// Satellite name as listed in the catalog (case-insensitive)
    #[arg(long)]
    satellite: Option<String>,
    /// Search window length in days
    #[arg(long)]
    days: Option<u32>,
    /// URL of the TLE catalog to fetch
    #[arg(long)]
    tle_url: Option<String>,
    /// IANA timezone for the report
    #[arg(long)]
    timezone: Option<String>,
    /// Coarse sampling resolution in minutes
    #[arg(long)]
    resolution_min: Option<u32>,
    /// Drop passes culminating below this altitude (degrees)
    #[arg(long, conflicts_with = "min_above_horizon_deg")]
    min_culmination_deg: Option<f64>,
    /// Count the satellite as risen only above this altitude (degrees)
    #[arg(long)]
    min_above_horizon_deg: Option<f64>,
    /// Abort the scan after this long, e.g. "30s"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<std::time::Duration>,
    /// With --timeout, report whatever was found before the budget ran out
    #[arg(long)]
    partial: bool,
    /// YAML config file with observer and default overrides
    #[arg(long)]
    config: Option<String>,
    /// Emit the pass list as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let query = match build_query(&cli, &config) {
        Ok(query) => query,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let ttl = match config.cache.ttl() {
        Ok(ttl) => ttl,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let search = SatelliteSearch::new(TleSource::with_cache_ttl(ttl));

    match search.run(&query).await {
        Ok(report) if cli.json => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                ExitCode::FAILURE
            }
        },
        Ok(report) => {
            print!("{}", report.to_text());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_query(cli: &Cli, config: &Config) -> Result<SearchQuery, String> {
    let configured = config.observer.as_ref().and_then(|o| o.location());

    let lat = cli
        .lat
        .or(configured.map(|o| o.latitude_deg))
        .ok_or("observer latitude required (--lat or config file)")?;
    let lon = cli
        .lon
        .or(configured.map(|o| o.longitude_deg))
        .ok_or("observer longitude required (--lon or config file)")?;

    let mut query = SearchQuery::new(lat, lon);
    query.elevation_m = cli
        .elevation_m
        .or(configured.map(|o| o.elevation_m))
        .unwrap_or(query.elevation_m);
    query.satellite_name = cli
        .satellite
        .clone()
        .unwrap_or_else(|| config.search.satellite.clone());
    query.range_days = cli.days.unwrap_or(config.search.range_days);
    query.tle_url = cli
        .tle_url
        .clone()
        .unwrap_or_else(|| config.search.tle_url.clone());
    query.timezone_name = cli
        .timezone
        .clone()
        .unwrap_or_else(|| config.search.timezone.clone());
    query.resolution_min = cli.resolution_min.unwrap_or(config.search.resolution_min);
    match (cli.min_culmination_deg, cli.min_above_horizon_deg) {
        // A flag picks the mode outright, whatever the config file says.
        (Some(t), None) => query.min_culmination_altitude_deg = Some(t),
        (None, Some(t)) => query.min_above_horizon_deg = Some(t),
        (None, None) => {
            if config.search.min_culmination_altitude_deg.is_some()
                && config.search.min_above_horizon_deg.is_some()
            {
                return Err(
                    "config file sets both min_culmination_altitude_deg and \
                     min_above_horizon_deg; pick one"
                        .into(),
                );
            }
            query.min_culmination_altitude_deg = config.search.min_culmination_altitude_deg;
            query.min_above_horizon_deg = config.search.min_above_horizon_deg;
        }
        // clap's conflicts_with rules this out
        (Some(_), Some(_)) => unreachable!(),
    }
    query.scan_budget_ms = cli.timeout.map(|t| t.as_millis() as u64);
    query.partial_on_timeout = cli.partial;
    Ok(query)
}
