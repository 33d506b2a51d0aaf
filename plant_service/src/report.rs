/// Report assembly and the short-lived report cache.
///
/// `precipitation_report` is the contract exposed to the chart and the plant:
/// one call per city produces the deviation series together with its summary.
///
/// # Clock injection
/// `ReportCache` takes `now: DateTime<Utc>` on every lookup rather than
/// calling `Utc::now()` itself, which keeps expiry deterministic in tests.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;

use crate::analysis::deviation::{build_series, compute_deviation};
use crate::cities::{lookup_city, City};
use crate::ingest::open_meteo::{fetch_samples, parse_archive_response, window_for};
use crate::logging::{self, DataSource};
use crate::model::{DailySample, DateWindow, PrecipError, PrecipReport};

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

/// Combines samples for `city` into a full report.
pub fn assemble_report(city: &City, window: DateWindow, samples: &[DailySample]) -> PrecipReport {
    let series = build_series(city, samples);
    let summary = compute_deviation(&series);
    PrecipReport {
        city_id: city.id.to_string(),
        window,
        series,
        summary,
    }
}

/// Fetches and evaluates the month of rainfall ending on `window_end`.
///
/// Errors: `UnknownCity` for an id outside the registry, plus whatever the
/// archive request produces. Nothing is retried.
pub fn precipitation_report(
    client: &reqwest::blocking::Client,
    base_url: &str,
    city_id: &str,
    window_end: NaiveDate,
) -> Result<PrecipReport, PrecipError> {
    let city = lookup_city(city_id)?;
    let window = window_for(window_end);
    let samples = fetch_samples(client, base_url, city, &window)?;
    logging::debug(
        DataSource::Archive,
        Some(city.id),
        &format!("{} daily samples for {}..{}", samples.len(), window.start, window.end),
    );
    Ok(assemble_report(city, window, &samples))
}

/// Builds a report from a previously saved archive response body.
pub fn report_from_body(
    city_id: &str,
    window_end: NaiveDate,
    body: &str,
) -> Result<PrecipReport, PrecipError> {
    let city = lookup_city(city_id)?;
    let samples = parse_archive_response(body)?;
    Ok(assemble_report(city, window_for(window_end), &samples))
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct CachedReport {
    report: PrecipReport,
    fetched_at: DateTime<Utc>,
}

/// Per-city cache of the latest successful report.
///
/// An entry is served while it is younger than the TTL and was computed for
/// the same window end; otherwise the report is fetched again. Failures are
/// never cached.
pub struct ReportCache {
    ttl: Duration,
    entries: HashMap<String, CachedReport>,
}

impl ReportCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.max(0)),
            entries: HashMap::new(),
        }
    }

    /// Returns a fresh cached report for `city_id`, if any.
    ///
    /// Age equal to the TTL is still fresh; strictly older is expired.
    pub fn get_fresh(
        &self,
        city_id: &str,
        window_end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<&PrecipReport> {
        self.entries
            .get(city_id)
            .filter(|c| c.report.window.end == window_end && now - c.fetched_at <= self.ttl)
            .map(|c| &c.report)
    }

    /// Returns the cached report or calls `fetch` and caches its result.
    pub fn get_or_fetch<F>(
        &mut self,
        city_id: &str,
        window_end: NaiveDate,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<PrecipReport, PrecipError>
    where
        F: FnOnce() -> Result<PrecipReport, PrecipError>,
    {
        if let Some(report) = self.get_fresh(city_id, window_end, now) {
            logging::debug(DataSource::Cache, Some(city_id), "serving cached report");
            return Ok(report.clone());
        }

        let report = fetch()?;
        self.entries.insert(
            city_id.to_string(),
            CachedReport {
                report: report.clone(),
                fetched_at: now,
            },
        );
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
