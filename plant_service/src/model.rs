/// Core data types for the drought plant precipitation service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond trivial accessors and no I/O; only types and
/// the error taxonomy surfaced to callers.

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sample types
// ---------------------------------------------------------------------------

/// One day of observed precipitation, normalized from the archive response.
///
/// `precipitation_mm` is already converted to millimetres and is never
/// negative; missing upstream values are represented as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySample {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
}

/// A daily sample enriched with the baseline expected for that day.
///
/// `expected_daily_mm` is the city's monthly average for the sample's own
/// calendar month divided by the number of days in that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationEntry {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub expected_daily_mm: f64,
}

/// Chronologically ordered entries, one per day returned by the archive.
/// Source order is preserved; the series is never re-sorted.
pub type DeviationSeries = Vec<DeviationEntry>;

/// Running totals over a `DeviationSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DeviationSummary {
    pub total_actual_mm: f64,
    pub total_expected_mm: f64,
}

impl DeviationSummary {
    /// Signed difference between observed and expected rainfall, in mm.
    pub fn deviation_mm(&self) -> f64 {
        self.total_actual_mm - self.total_expected_mm
    }
}

/// One point of the cumulative chart: running sums up to and including `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub expected_mm: f64,
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Inclusive calendar window requested from the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything the chart and the plant need for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecipReport {
    pub city_id: String,
    pub window: DateWindow,
    pub series: DeviationSeries,
    pub summary: DeviationSummary,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or evaluating precipitation data.
///
/// None of these are retried automatically and none are replaced by a
/// default value; either a full report is produced or an error is returned.
#[derive(Debug, PartialEq)]
pub enum PrecipError {
    /// The requested city id is not in the registry.
    UnknownCity(String),
    /// The archive answered but returned no usable daily series.
    DataUnavailable(String),
    /// Expected rainfall over the window is zero, so the deviation ratio
    /// is undefined.
    InvalidBaseline,
    /// Non-2xx HTTP response from the archive API.
    Http(u16),
    /// The response body could not be deserialized.
    Parse(String),
    /// The request never produced a response (DNS, TLS, timeout...).
    Transport(String),
    /// The configuration file could not be read or parsed.
    Config(String),
}

impl std::fmt::Display for PrecipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrecipError::UnknownCity(id) => write!(f, "Unknown city: {}", id),
            PrecipError::DataUnavailable(msg) => write!(f, "No data available: {}", msg),
            PrecipError::InvalidBaseline => {
                write!(f, "Invalid baseline: expected precipitation is zero")
            }
            PrecipError::Http(code) => write!(f, "HTTP error: {}", code),
            PrecipError::Parse(msg) => write!(f, "Parse error: {}", msg),
            PrecipError::Transport(msg) => write!(f, "Request failed: {}", msg),
            PrecipError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PrecipError {}

impl From<reqwest::Error> for PrecipError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PrecipError::Http(status.as_u16()),
            None => PrecipError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PrecipError {
    fn from(err: serde_json::Error) -> Self {
        PrecipError::Parse(err.to_string())
    }
}
