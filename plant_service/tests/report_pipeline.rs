/// Offline tests for the full pipeline: saved archive response → samples →
/// deviation series → summary → health.
///
/// The fixture is a real-shaped archive response for NYC covering
/// 2024-01-15 through 2024-02-15 (local midnights, EST), with a few null
/// days, so the window crosses a month boundary in a leap year.
///
/// Run with: cargo test --test report_pipeline

use chrono::NaiveDate;

use plant_service::analysis::deviation::{build_series, compute_deviation};
use plant_service::analysis::presentation::{
    clamp_health, cumulative_series, plant_water_level, to_health_percent,
};
use plant_service::cities::{find_city, lookup_city};
use plant_service::ingest::open_meteo::{missing_value_count, parse_archive_response};
use plant_service::model::PrecipError;
use plant_service::report::{assemble_report, report_from_body};

const NYC_FIXTURE: &str = include_str!("fixtures/nyc_2024-02-15.json");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn test_fixture_normalizes_to_one_sample_per_local_day() {
    let samples = parse_archive_response(NYC_FIXTURE).expect("fixture should parse");
    assert_eq!(samples.len(), 32, "Jan 15 through Feb 15 inclusive is 32 days");
    assert_eq!(samples.first().unwrap().date, date(2024, 1, 15));
    assert_eq!(samples.last().unwrap().date, date(2024, 2, 15));

    for pair in samples.windows(2) {
        assert_eq!(
            pair[1].date.signed_duration_since(pair[0].date).num_days(),
            1,
            "days should be consecutive and in source order"
        );
    }
    assert!(samples.iter().all(|s| s.precipitation_mm >= 0.0));
    assert_eq!(missing_value_count(NYC_FIXTURE).unwrap(), 5);
}

#[test]
fn test_fixture_values_are_converted_from_tenths() {
    let samples = parse_archive_response(NYC_FIXTURE).unwrap();
    // First days of the fixture: 0.0, 12.0, null, 45.5
    assert_eq!(samples[0].precipitation_mm, 0.0);
    assert_eq!(samples[1].precipitation_mm, 1.2);
    assert_eq!(samples[2].precipitation_mm, 0.0);
    assert_eq!(samples[3].precipitation_mm, 4.55);
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[test]
fn test_report_uses_each_days_own_month() {
    let report = report_from_body("nyc", date(2024, 2, 15), NYC_FIXTURE).expect("valid report");

    assert_eq!(report.window.start, date(2024, 1, 15));
    assert_eq!(report.window.end, date(2024, 2, 15));
    assert_eq!(report.series.len(), 32);

    // 17 January days at 93.6/31 and 15 (leap-year) February days at 83.9/29.
    let expected = 17.0 * (93.6 / 31.0) + 15.0 * (83.9 / 29.0);
    assert!(
        approx_eq(report.summary.total_expected_mm, expected),
        "expected {} got {}",
        expected,
        report.summary.total_expected_mm
    );
    assert!(approx_eq(report.summary.total_actual_mm, 39.95));
}

#[test]
fn test_report_health_and_water_level() {
    let report = report_from_body("nyc", date(2024, 2, 15), NYC_FIXTURE).unwrap();
    let health = to_health_percent(&report.summary).expect("baseline is positive");

    let expected_total = 17.0 * (93.6 / 31.0) + 15.0 * (83.9 / 29.0);
    let manual = 100.0 + ((39.95 - expected_total) / expected_total) * 100.0;
    assert!(approx_eq(health, manual));

    // A dry month: well below average, plant less than half watered.
    assert!(health < 100.0);
    assert!(plant_water_level(health) < 0.5);
    assert_eq!(clamp_health(health), health);
}

#[test]
fn test_cumulative_series_ends_at_summary_totals() {
    let report = report_from_body("nyc", date(2024, 2, 15), NYC_FIXTURE).unwrap();
    let points = cumulative_series(&report.series);
    let last = points.last().expect("non-empty series");

    assert_eq!(points.len(), report.series.len());
    assert!(approx_eq(last.precipitation_mm, report.summary.total_actual_mm));
    assert!(approx_eq(last.expected_mm, report.summary.total_expected_mm));
    assert!(
        points.windows(2).all(|p| p[1].expected_mm > p[0].expected_mm),
        "expected running sum must strictly increase for a city with rainfall every month"
    );
}

#[test]
fn test_same_body_evaluated_for_a_different_city_uses_its_averages() {
    let nyc = report_from_body("nyc", date(2024, 2, 15), NYC_FIXTURE).unwrap();
    let la = report_from_body("la", date(2024, 2, 15), NYC_FIXTURE).unwrap();

    assert_eq!(nyc.summary.total_actual_mm, la.summary.total_actual_mm);
    let la_expected = 17.0 * (49.1 / 31.0) + 15.0 * (39.1 / 29.0);
    assert!(approx_eq(la.summary.total_expected_mm, la_expected));
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_city_is_configuration_error() {
    assert_eq!(
        report_from_body("springfield", date(2024, 2, 15), NYC_FIXTURE).unwrap_err(),
        PrecipError::UnknownCity("springfield".to_string())
    );
    assert!(lookup_city("").is_err());
}

#[test]
fn test_no_daily_block_is_data_unavailable() {
    let body = r#"{ "latitude": 40.7, "longitude": -74.0, "utc_offset_seconds": -18000 }"#;
    assert!(matches!(
        report_from_body("nyc", date(2024, 2, 15), body),
        Err(PrecipError::DataUnavailable(_))
    ));
}

#[test]
fn test_empty_series_has_invalid_baseline() {
    let city = find_city("cdmx").unwrap();
    let series = build_series(city, &[]);
    let summary = compute_deviation(&series);
    assert_eq!(summary.total_actual_mm, 0.0);
    assert_eq!(summary.total_expected_mm, 0.0);
    assert_eq!(to_health_percent(&summary), Err(PrecipError::InvalidBaseline));

    let report = assemble_report(
        city,
        plant_service::ingest::open_meteo::window_for(date(2024, 7, 1)),
        &[],
    );
    assert!(to_health_percent(&report.summary).is_err());
}
