//! Presentation mapping: what the chart and the plant actually consume.
//!
//! Health is a percentage where 100 means "rained exactly as much as
//! usual". The animation clamps it to [0, 200] and feeds the plant a water
//! level in [0, 1], so an average month renders a half-watered plant.

use crate::model::{CumulativePoint, DeviationEntry, DeviationSummary, PrecipError};

pub const HEALTH_AS_EXPECTED: f64 = 100.0;
pub const HEALTH_MIN: f64 = 0.0;
pub const HEALTH_MAX: f64 = 200.0;

/// Maps a summary to a health percentage:
/// `100 + ((actual - expected) / expected) * 100`.
///
/// Returns `InvalidBaseline` when the expected total is zero (or not a
/// finite positive number) instead of producing NaN or infinity.
pub fn to_health_percent(summary: &DeviationSummary) -> Result<f64, PrecipError> {
    let expected = summary.total_expected_mm;
    if !expected.is_finite() || expected <= 0.0 {
        return Err(PrecipError::InvalidBaseline);
    }
    let percent = HEALTH_AS_EXPECTED + (summary.deviation_mm() / expected) * 100.0;
    if !percent.is_finite() {
        return Err(PrecipError::InvalidBaseline);
    }
    Ok(percent)
}

/// Clamps a health percentage to the range the animation accepts.
pub fn clamp_health(percent: f64) -> f64 {
    percent.clamp(HEALTH_MIN, HEALTH_MAX)
}

/// Shader water level in [0, 1]: clamped health scaled down by 200.
pub fn plant_water_level(percent: f64) -> f64 {
    clamp_health(percent) / HEALTH_MAX
}

/// Running sums of observed and expected rainfall, one point per day.
///
/// The first point equals the first day; an empty series yields no points.
pub fn cumulative_series(series: &[DeviationEntry]) -> Vec<CumulativePoint> {
    let mut actual = 0.0;
    let mut expected = 0.0;
    series
        .iter()
        .map(|entry| {
            actual += entry.precipitation_mm;
            expected += entry.expected_daily_mm;
            CumulativePoint {
                date: entry.date,
                precipitation_mm: actual,
                expected_mm: expected,
            }
        })
        .collect()
}

/// Millimetres rounded to two decimals, e.g. `"12.35mm"`.
pub fn format_mm(value: f64) -> String {
    format!("{:.2}mm", value)
}

/// The caption shown under the plant.
pub fn summary_caption(summary: &DeviationSummary) -> String {
    format!(
        "{} of rain in the last month, vs {} avg",
        format_mm(summary.total_actual_mm),
        format_mm(summary.total_expected_mm)
    )
}

/// Signed deviation line, e.g. `"-3.20mm"` or `"+1.05mm"`.
pub fn deviation_caption(summary: &DeviationSummary) -> String {
    let deviation = summary.deviation_mm();
    let sign = if deviation > 0.0 { "+" } else { "" };
    format!("{}{}", sign, format_mm(deviation))
}
