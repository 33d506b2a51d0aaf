//! Deviation of observed rainfall from the seasonal baseline.
//!
//! Every day is compared against the average for its own calendar month, so
//! a window that crosses a month boundary mixes the two baselines day by day.

use chrono::{Datelike, NaiveDate};

use crate::cities::City;
use crate::model::{DailySample, DeviationEntry, DeviationSeries, DeviationSummary};

/// Number of days in `month` (1..=12) of `year`, accounting for leap years.
///
/// Returns `None` for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Rainfall expected on `date`: the month's average spread evenly over the
/// days of that month.
pub fn expected_daily_mm(city: &City, date: NaiveDate) -> f64 {
    let month = date.month();
    // A valid NaiveDate always has a month in 1..=12 with 28..=31 days.
    let average = city.monthly_average_for(month).unwrap_or(0.0);
    let days = days_in_month(date.year(), month).unwrap_or(30);
    average / f64::from(days)
}

/// Attaches each sample's expected baseline. Order is preserved.
pub fn build_series(city: &City, samples: &[DailySample]) -> DeviationSeries {
    samples
        .iter()
        .map(|s| DeviationEntry {
            date: s.date,
            precipitation_mm: s.precipitation_mm,
            expected_daily_mm: expected_daily_mm(city, s.date),
        })
        .collect()
}

/// Sums observed and expected rainfall over the series.
///
/// An empty series yields `{0, 0}`. No rounding is applied.
pub fn compute_deviation(series: &[DeviationEntry]) -> DeviationSummary {
    series.iter().fold(DeviationSummary::default(), |acc, entry| DeviationSummary {
        total_actual_mm: acc.total_actual_mm + entry.precipitation_mm,
        total_expected_mm: acc.total_expected_mm + entry.expected_daily_mm,
    })
}
