//! Registry Verification Module
//!
//! Checks every city in the registry against the live archive API to confirm
//! that its coordinates and time zone are accepted and that the archive
//! actually returns daily precipitation for the current window.
//!
//! Run this after editing the registry, before trusting the plant.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cities::{City, CITY_REGISTRY};
use crate::config::ServiceConfig;
use crate::ingest::open_meteo::{
    build_client, fetch_body, missing_value_count, parse_archive_response, window_for,
};
use crate::logging;
use crate::model::PrecipError;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub window_end: NaiveDate,
    pub results: Vec<CityVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityVerification {
    pub city_id: String,
    pub status: VerificationStatus,
    pub sample_count: usize,
    pub missing_values: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    /// Samples came back but some days had no value.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Single city
// ============================================================================

/// Classifies an archive body for one city.
pub fn evaluate_body(city: &City, body: &str) -> CityVerification {
    let mut result = CityVerification {
        city_id: city.id.to_string(),
        status: VerificationStatus::Failed,
        sample_count: 0,
        missing_values: 0,
        error_message: None,
    };

    match parse_archive_response(body) {
        Ok(samples) => {
            result.sample_count = samples.len();
            result.missing_values = missing_value_count(body).unwrap_or(0);
            result.status = if result.missing_values == 0 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

pub fn verify_city(
    client: &reqwest::blocking::Client,
    config: &ServiceConfig,
    city: &City,
    window_end: NaiveDate,
) -> CityVerification {
    let window = window_for(window_end);
    match fetch_body(client, &config.archive.base_url, city, &window) {
        Ok(body) => evaluate_body(city, &body),
        Err(e) => {
            logging::log_archive_failure(city.id, "verification fetch", &e);
            CityVerification {
                city_id: city.id.to_string(),
                status: VerificationStatus::Failed,
                sample_count: 0,
                missing_values: 0,
                error_message: Some(e.to_string()),
            }
        }
    }
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn summarize(results: &[CityVerification]) -> VerificationSummary {
    let failed = results
        .iter()
        .filter(|r| r.status == VerificationStatus::Failed)
        .count();
    VerificationSummary {
        total: results.len(),
        working: results.len() - failed,
        failed,
    }
}

pub fn run_full_verification(config: &ServiceConfig) -> Result<VerificationReport, PrecipError> {
    let client = build_client(config)?;
    let window_end = Utc::now().date_naive();

    println!("🔍 Verifying cities against the archive...");
    let mut results = Vec::new();
    for city in CITY_REGISTRY {
        print!("  {} ... ", city.id);
        let result = verify_city(&client, config, city, window_end);

        match result.status {
            VerificationStatus::Success => {
                println!("✓ OK ({} days)", result.sample_count);
            }
            VerificationStatus::PartialSuccess => {
                println!(
                    "⚠ Partial ({} of {} days missing)",
                    result.missing_values, result.sample_count
                );
            }
            VerificationStatus::Failed => {
                println!("✗ FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"));
            }
        }

        results.push(result);
    }

    let summary = summarize(&results);
    logging::log_verification_summary(summary.total, summary.working, summary.failed);

    Ok(VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        window_end,
        results,
        summary,
    })
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY (window ending {})", report.window_end);
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!(
        "Cities:    {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.working, report.summary.total
    );
    println!("═══════════════════════════════════════════════════════════");
}
