/// Service configuration.
///
/// Settings are read from a TOML file (default `./plant_service.toml`) and
/// every field has a default, so a missing file is not an error. Values from
/// `.env` / the process environment are applied on top:
///
/// - `PLANT_CONFIG`: path of the TOML file to load
/// - `PLANT_ARCHIVE_URL`: overrides `[archive] base_url`

use serde::Deserialize;
use std::path::Path;

use crate::logging::LogLevel;
use crate::model::PrecipError;

pub const DEFAULT_CONFIG_PATH: &str = "./plant_service.toml";
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Page revalidation window of the front-end: one hour.
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Config structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub archive: ArchiveConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchiveConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of "debug", "info", "warn", "error".
    pub level: String,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: i64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARCHIVE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            console_timestamps: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_CACHE_TTL_SECS }
    }
}

impl LoggingConfig {
    /// Parsed log level; unrecognized names fall back to `Info`.
    pub fn min_level(&self) -> LogLevel {
        match self.level.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a TOML document into a config. Missing sections use defaults.
pub fn parse_config(text: &str) -> Result<ServiceConfig, PrecipError> {
    toml::from_str(text).map_err(|e| PrecipError::Config(e.to_string()))
}

/// Loads a config file. A file that does not exist yields the defaults;
/// a file that exists but cannot be read or parsed is an error.
pub fn load_config_file(path: &Path) -> Result<ServiceConfig, PrecipError> {
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| PrecipError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&text)
}

/// Loads `.env`, resolves the config path (explicit argument, then
/// `PLANT_CONFIG`, then the default) and applies environment overrides.
pub fn load_config(explicit_path: Option<&Path>) -> Result<ServiceConfig, PrecipError> {
    dotenv::dotenv().ok();

    let env_path = std::env::var("PLANT_CONFIG").ok();
    let path = match (explicit_path, env_path.as_deref()) {
        (Some(p), _) => p.to_path_buf(),
        (None, Some(p)) => Path::new(p).to_path_buf(),
        (None, None) => Path::new(DEFAULT_CONFIG_PATH).to_path_buf(),
    };

    let mut config = load_config_file(&path)?;
    if let Ok(url) = std::env::var("PLANT_ARCHIVE_URL") {
        if !url.trim().is_empty() {
            config.archive.base_url = url.trim().to_string();
        }
    }
    Ok(config)
}
