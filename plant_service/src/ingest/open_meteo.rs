/// Open-Meteo Historical Weather (archive) API client
///
/// Retrieves daily precipitation sums for a city's coordinates over a
/// one-month window ending on a given day, and normalizes the response into
/// a uniform sequence of `DailySample`s.
///
/// API Documentation: https://open-meteo.com/en/docs/historical-weather-api
///
/// The archive reports `precipitation_sum` in tenths of a millimetre for the
/// requests this service makes; values are divided by 10 on ingest.

use chrono::{DateTime, Months, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

use crate::analysis::deviation::build_series;
use crate::cities::{lookup_city, City};
use crate::config::ServiceConfig;
use crate::logging::{self, DataSource};
use crate::model::{DailySample, DateWindow, DeviationSeries, PrecipError};

/// Daily variable requested from the archive.
pub const DAILY_VARIABLE: &str = "precipitation_sum";

/// Upstream values are tenths of a millimetre.
const TENTHS_PER_MM: f64 = 10.0;

// ============================================================================
// Archive API Response Structures
// ============================================================================

/// Top-level archive response (`timeformat=unixtime`).
#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    #[serde(default)]
    pub utc_offset_seconds: i64,
    pub timezone: Option<String>,
    pub daily: Option<ArchiveDaily>,
    /// Set on error bodies, together with `reason`.
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
}

/// The `daily` block. Index `i` of each variable belongs to `time[i]`.
#[derive(Debug, Deserialize)]
pub struct ArchiveDaily {
    #[serde(default)]
    pub time: Vec<i64>,
    pub precipitation_sum: Option<Vec<Option<f64>>>,
}

// ============================================================================
// Window and URL construction
// ============================================================================

/// The one-month window ending on `end`.
///
/// The start keeps the same day of month, clamped to the last day of the
/// previous month when that day does not exist there (Mar 31 → Feb 28/29).
pub fn window_for(end: NaiveDate) -> DateWindow {
    let start = end.checked_sub_months(Months::new(1)).unwrap_or(end);
    DateWindow { start, end }
}

/// Builds the archive request URL for a city and window.
///
/// # Example
/// ```text
/// https://archive-api.open-meteo.com/v1/archive?latitude=37.774929&longitude=-122.419416
///   &start_date=2024-04-01&end_date=2024-05-01&daily=precipitation_sum
///   &timezone=America/Los_Angeles&timeformat=unixtime
/// ```
pub fn build_archive_url(base_url: &str, city: &City, window: &DateWindow) -> String {
    format!(
        "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily={}&timezone={}&timeformat=unixtime",
        base_url.trim_end_matches('/'),
        city.latitude,
        city.longitude,
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d"),
        DAILY_VARIABLE,
        city.timezone,
    )
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Creates the blocking HTTP client used for archive requests.
pub fn build_client(config: &ServiceConfig) -> Result<reqwest::blocking::Client, PrecipError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.archive.timeout_secs))
        .build()
        .map_err(|e| PrecipError::Transport(e.to_string()))
}

/// Request the raw archive body for one city over `window`.
///
/// Makes exactly one request; failures are returned, never retried.
pub fn fetch_body(
    client: &reqwest::blocking::Client,
    base_url: &str,
    city: &City,
    window: &DateWindow,
) -> Result<String, PrecipError> {
    let url = build_archive_url(base_url, city, window);
    logging::debug(DataSource::Archive, Some(city.id), &format!("GET {}", url));

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        if let Some(reason) = error_reason(&body) {
            logging::warn(
                DataSource::Archive,
                Some(city.id),
                &format!("archive rejected request: {}", reason),
            );
        }
        return Err(PrecipError::Http(status.as_u16()));
    }

    Ok(body)
}

/// Fetch daily precipitation for one city over `window`.
pub fn fetch_samples(
    client: &reqwest::blocking::Client,
    base_url: &str,
    city: &City,
    window: &DateWindow,
) -> Result<Vec<DailySample>, PrecipError> {
    let body = fetch_body(client, base_url, city, window)?;
    parse_archive_response(&body)
}

/// Fetch a city's deviation series for the month ending on `window_end`.
///
/// The city id must exist in the registry; an unknown id is an error.
pub fn fetch_series(
    client: &reqwest::blocking::Client,
    base_url: &str,
    city_id: &str,
    window_end: NaiveDate,
) -> Result<DeviationSeries, PrecipError> {
    let city = lookup_city(city_id)?;
    let window = window_for(window_end);
    let samples = fetch_samples(client, base_url, city, &window)?;
    Ok(build_series(city, &samples))
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse an archive response body into daily samples.
///
/// - Each timestamp is shifted by `utc_offset_seconds` and its calendar
///   date taken, so samples are dated in the city's local time zone.
/// - Values are converted from tenths of a millimetre to millimetres.
/// - A null, negative or missing value at any index counts as `0.0`.
/// - An error body, a missing `daily` block, an empty time array or a
///   missing `precipitation_sum` array is `DataUnavailable`.
pub fn parse_archive_response(body: &str) -> Result<Vec<DailySample>, PrecipError> {
    let response: ArchiveResponse = serde_json::from_str(body)?;

    if response.error {
        let reason = response.reason.unwrap_or_else(|| "unspecified".to_string());
        return Err(PrecipError::DataUnavailable(reason));
    }

    let daily = response
        .daily
        .ok_or_else(|| PrecipError::DataUnavailable("response has no daily block".to_string()))?;

    if daily.time.is_empty() {
        return Err(PrecipError::DataUnavailable("daily block has no samples".to_string()));
    }

    let values = daily.precipitation_sum.as_deref().ok_or_else(|| {
        PrecipError::DataUnavailable("response has no precipitation_sum".to_string())
    })?;

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| -> Result<DailySample, PrecipError> {
            let date = local_date(timestamp, response.utc_offset_seconds)?;
            let raw = values.get(i).copied().flatten();
            Ok(DailySample {
                date,
                precipitation_mm: tenths_to_mm(raw),
            })
        })
        .collect()
}

/// Number of days in the response whose value is null or absent.
pub fn missing_value_count(body: &str) -> Result<usize, PrecipError> {
    let response: ArchiveResponse = serde_json::from_str(body)?;
    Ok(response
        .daily
        .map(|daily| {
            let values = daily.precipitation_sum.unwrap_or_default();
            (0..daily.time.len())
                .filter(|&i| values.get(i).copied().flatten().is_none())
                .count()
        })
        .unwrap_or(0))
}

/// Converts a raw archive value to millimetres; missing values are zero.
pub fn tenths_to_mm(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v / TENTHS_PER_MM,
        _ => 0.0,
    }
}

fn local_date(timestamp: i64, utc_offset_seconds: i64) -> Result<NaiveDate, PrecipError> {
    timestamp
        .checked_add(utc_offset_seconds)
        .and_then(|local| DateTime::from_timestamp(local, 0))
        .map(|dt| dt.date_naive())
        .ok_or_else(|| PrecipError::Parse(format!("timestamp out of range: {}", timestamp)))
}

fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ArchiveResponse>(body)
        .ok()
        .filter(|r| r.error)
        .and_then(|r| r.reason)
}

// ============================================================================
// Tests
// ============================================================================
