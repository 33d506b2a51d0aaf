use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use plant_service::analysis::presentation::{
    cumulative_series, deviation_caption, plant_water_level, summary_caption, to_health_percent,
};
use plant_service::cities::{display_name, CITY_REGISTRY, DEFAULT_CITY};
use plant_service::config::{load_config, ServiceConfig};
use plant_service::ingest::open_meteo::build_client;
use plant_service::logging::{self, DataSource};
use plant_service::model::{CumulativePoint, PrecipError, PrecipReport};
use plant_service::report::{precipitation_report, report_from_body, ReportCache};
use plant_service::verify;

#[derive(Parser, Debug)]
#[command(name = "plant_service")]
#[command(about = "How healthy is a city's plant? Last month's rain vs the monthly average")]
struct Cli {
    /// City id (see --list). Defaults to the landing city.
    city: Option<String>,

    /// Last day of the window (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Read a saved archive response instead of calling the API
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Path to the TOML config (overrides PLANT_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List registered cities and their monthly averages
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Check every registered city against the live archive
    #[arg(long, default_value_t = false)]
    verify: bool,

    /// Redraw every N minutes; the archive is queried at most once per cache TTL
    #[arg(long)]
    watch: Option<u64>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    display_name: String,
    report: &'a PrecipReport,
    cumulative: Vec<CumulativePoint>,
    health_percent: Option<f64>,
    water_level: Option<f64>,
    health_error: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let city = cli.city.as_deref().unwrap_or(DEFAULT_CITY);
            let source = match e {
                PrecipError::UnknownCity(_) => DataSource::Registry,
                _ => DataSource::System,
            };
            logging::error(source, Some(city), &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &ServiceConfig) -> Result<(), PrecipError> {
    if cli.list {
        print_registry();
        return Ok(());
    }

    if cli.verify {
        let report = verify::run_full_verification(config)?;
        verify::print_summary(&report);
        return Ok(());
    }

    let city_id = cli.city.as_deref().unwrap_or(DEFAULT_CITY);

    if let Some(minutes) = cli.watch {
        return watch(cli, config, city_id, minutes);
    }

    let window_end = cli.date.unwrap_or_else(|| Utc::now().date_naive());

    let report = match &cli.from_file {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .map_err(|e| PrecipError::DataUnavailable(format!("{}: {}", path.display(), e)))?;
            report_from_body(city_id, window_end, &body)?
        }
        None => {
            let client = build_client(config)?;
            precipitation_report(&client, &config.archive.base_url, city_id, window_end)?
        }
    };

    render(cli, &report)
}

/// Redraws the report forever. A failed tick is logged and the next tick
/// tries again; only successful reports are cached.
fn watch(cli: &Cli, config: &ServiceConfig, city_id: &str, minutes: u64) -> Result<(), PrecipError> {
    let client = build_client(config)?;
    let mut cache = ReportCache::new(config.cache.ttl_secs);
    let interval = watch_interval(minutes);

    loop {
        let now = Utc::now();
        let window_end = cli.date.unwrap_or_else(|| now.date_naive());
        let result = cache.get_or_fetch(city_id, window_end, now, || {
            precipitation_report(&client, &config.archive.base_url, city_id, window_end)
        });

        match result {
            Ok(report) => {
                if let Err(e) = render(cli, &report) {
                    logging::warn(DataSource::System, Some(city_id), &e.to_string());
                }
            }
            Err(PrecipError::UnknownCity(id)) => return Err(PrecipError::UnknownCity(id)),
            Err(e) => logging::log_archive_failure(city_id, "report refresh", &e),
        }

        std::thread::sleep(interval);
    }
}

/// Sleep between redraws; at least one minute, saturating for huge values.
fn watch_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

fn render(cli: &Cli, report: &PrecipReport) -> Result<(), PrecipError> {
    logging::info(
        DataSource::Archive,
        Some(&report.city_id),
        &format!("{} days from {} to {}", report.series.len(), report.window.start, report.window.end),
    );

    let health = to_health_percent(&report.summary);

    if cli.json {
        let output = JsonOutput {
            display_name: display_name(&report.city_id),
            report,
            cumulative: cumulative_series(&report.series),
            health_percent: health.as_ref().ok().copied(),
            water_level: health.as_ref().ok().map(|h| plant_water_level(*h)),
            health_error: health.as_ref().err().map(|e| e.to_string()),
        };
        let text = serde_json::to_string_pretty(&output)?;
        println!("{}", text);
    } else {
        print_report(report, &health);
    }

    // Health is undefined on a zero baseline; that is a failure for the caller.
    health.map(|_| ())
}

fn print_report(report: &PrecipReport, health: &Result<f64, PrecipError>) {
    println!("{}", display_name(&report.city_id));
    println!("{}", summary_caption(&report.summary));
    println!("{}", deviation_caption(&report.summary));
    match health {
        Ok(h) => println!("Health: {:.1}%  (water level {:.2})", h, plant_water_level(*h)),
        Err(e) => println!("Health: n/a ({})", e),
    }
    println!();
    println!("{:<12} {:>12} {:>12}", "Date", "Recorded", "Average");
    for point in cumulative_series(&report.series) {
        println!(
            "{:<12} {:>10.2}mm {:>10.2}mm",
            point.date.format("%b %d"),
            point.precipitation_mm,
            point.expected_mm
        );
    }
}

fn print_registry() {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    for city in CITY_REGISTRY {
        println!(
            "{:<6} {:<6} ({:.4}, {:.4}) {}",
            city.id,
            city.display_name(),
            city.latitude,
            city.longitude,
            city.timezone
        );
        let months: Vec<String> = MONTHS
            .iter()
            .zip(city.monthly_average_mm.iter())
            .map(|(m, v)| format!("{} {:.1}", m, v))
            .collect();
        println!("       {}  (annual {:.1}mm)", months.join("  "), city.annual_average_mm());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_has_one_minute_floor() {
        assert_eq!(watch_interval(0), Duration::from_secs(60));
        assert_eq!(watch_interval(15), Duration::from_secs(900));
    }

    #[test]
    fn test_watch_interval_saturates_instead_of_overflowing() {
        assert_eq!(watch_interval(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
