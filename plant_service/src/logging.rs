/// Structured logging for the drought plant service
///
/// Provides context-rich logging with city identifiers, timestamps and
/// severity levels. Supports both console output and file-based logging
/// for long-running use.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The Open-Meteo historical archive.
    Archive,
    Registry,
    Cache,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Archive => write!(f, "ARCHIVE"),
            DataSource::Registry => write!(f, "REGISTRY"),
            DataSource::Cache => write!(f, "CACHE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller asked for something that does not exist
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: &DataSource, city_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            level,
            source,
            city_id,
            message,
        );
        let city_part = city_id.map(|c| format!(" [{}]", c)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, city_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, city_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Single-line log entry as written to the log file.
fn format_entry(
    timestamp: &str,
    level: LogLevel,
    source: &DataSource,
    city_id: Option<&str>,
    message: &str,
) -> String {
    let city_part = city_id.map(|c| format!(" [{}]", c)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, source, city_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, source: DataSource, city_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, city_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, city_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, city_id, message);
}

/// Log a warning message
pub fn warn(source: DataSource, city_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, city_id, message);
}

/// Log an error message
pub fn error(source: DataSource, city_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, city_id, message);
}

/// Log a debug message
pub fn debug(source: DataSource, city_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, city_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an archive failure based on the error message
pub fn classify_archive_failure(error_message: &str) -> FailureType {
    if error_message.starts_with("Unknown city") {
        FailureType::Expected
    } else if error_message.contains("HTTP error")
        || error_message.contains("Parse error")
        || error_message.contains("timed out")
    {
        FailureType::Unexpected
    } else {
        // Empty daily block: location may be outside archive coverage or the
        // window may be too recent to have been published yet.
        FailureType::Unknown
    }
}

/// Log an archive failure with automatic classification
pub fn log_archive_failure(city_id: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_archive_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::Archive, Some(city_id), &message),
        FailureType::Unexpected => error(DataSource::Archive, Some(city_id), &message),
        FailureType::Unknown => warn(DataSource::Archive, Some(city_id), &message),
    }
}

// ---------------------------------------------------------------------------
// Verification Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a registry verification run
pub fn log_verification_summary(total: usize, working: usize, failed: usize) {
    let message = format!(
        "Verification complete: {}/{} working, {} failed",
        working, total, failed
    );

    if failed == 0 {
        info(DataSource::Archive, None, &message);
    } else if working == 0 {
        error(DataSource::Archive, None, &message);
    } else {
        warn(DataSource::Archive, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrecipError;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let unknown_city = PrecipError::UnknownCity("gotham".into()).to_string();
        assert_eq!(classify_archive_failure(&unknown_city), FailureType::Expected);

        let http = PrecipError::Http(500).to_string();
        assert_eq!(classify_archive_failure(&http), FailureType::Unexpected);

        let parse = PrecipError::Parse("expected value".into()).to_string();
        assert_eq!(classify_archive_failure(&parse), FailureType::Unexpected);

        let empty = PrecipError::DataUnavailable("empty daily block".into()).to_string();
        assert_eq!(classify_archive_failure(&empty), FailureType::Unknown);
    }

    #[test]
    fn test_entry_format_includes_city_when_present() {
        let entry = format_entry(
            "2024-05-01 13:00:00 UTC",
            LogLevel::Warning,
            &DataSource::Archive,
            Some("sf"),
            "slow response",
        );
        assert_eq!(entry, "2024-05-01 13:00:00 UTC WARN ARCHIVE [sf]: slow response");

        let entry = format_entry("t", LogLevel::Info, &DataSource::System, None, "up");
        assert_eq!(entry, "t INFO SYS: up");
    }
}
