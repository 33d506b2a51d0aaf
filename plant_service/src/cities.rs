/// City registry for the drought plant service.
///
/// Defines the canonical list of cities the plant can be grown for, along
/// with their coordinates, local time zone and historical monthly rainfall.
/// This is the single source of truth for city ids and averages; all other
/// modules should look cities up here rather than carrying their own tables.

use crate::model::PrecipError;

// ---------------------------------------------------------------------------
// City metadata
// ---------------------------------------------------------------------------

/// City shown when the caller does not name one (the app's landing page).
/// Never used as a substitute for an unknown id.
pub const DEFAULT_CITY: &str = "nyc";

/// Metadata for a single city.
#[derive(Debug)]
pub struct City {
    /// Short lowercase id used in URLs and on the command line.
    pub id: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// IANA time zone the archive aggregates daily sums in.
    pub timezone: &'static str,
    /// Historical mean total precipitation per calendar month, in mm,
    /// indexed January..December.
    pub monthly_average_mm: [f64; 12],
}

impl City {
    /// Monthly average for `month` (1 = January). Returns `None` outside 1..=12.
    pub fn monthly_average_for(&self, month: u32) -> Option<f64> {
        match month {
            1..=12 => Some(self.monthly_average_mm[(month - 1) as usize]),
            _ => None,
        }
    }

    /// Sum of the twelve monthly averages.
    pub fn annual_average_mm(&self) -> f64 {
        self.monthly_average_mm.iter().sum()
    }

    pub fn display_name(&self) -> String {
        display_name(self.id)
    }
}

/// All supported cities.
///
/// Sources:
///   - Coordinates: city-centre reference points
///   - Monthly normals: long-term climate normals, converted to mm
pub static CITY_REGISTRY: &[City] = &[
    City {
        id: "nyc",
        latitude: 40.7362621,
        longitude: -73.9911719,
        timezone: "America/New_York",
        monthly_average_mm: [
            93.6, 83.9, 100.6, 105.7, 111.6, 138.4, 113.7, 121.6, 97.0, 108.9, 73.3, 127.4,
        ],
    },
    City {
        id: "sf",
        latitude: 37.774929,
        longitude: -122.419416,
        timezone: "America/Los_Angeles",
        monthly_average_mm: [
            70.3, 74.8, 84.5, 44.6, 7.1, 5.2, 0.4, 0.7, 3.4, 23.1, 43.3, 111.5,
        ],
    },
    City {
        id: "la",
        latitude: 34.052234,
        longitude: -118.243685,
        timezone: "America/Los_Angeles",
        monthly_average_mm: [
            49.1, 39.1, 34.9, 14.1, 6.2, 0.4, 1.3, 0.1, 4.6, 9.2, 14.5, 61.3,
        ],
    },
    City {
        id: "cdmx",
        latitude: 19.432608,
        longitude: -99.133209,
        timezone: "America/Mexico_City",
        monthly_average_mm: [
            21.3, 20.7, 25.8, 45.4, 72.5, 172.8, 200.6, 203.0, 200.6, 98.4, 33.3, 14.3,
        ],
    },
];

/// Returns the ids of all registered cities, in registry order.
pub fn all_city_ids() -> Vec<&'static str> {
    CITY_REGISTRY.iter().map(|c| c.id).collect()
}

/// Looks up a city by id. Returns `None` if not found.
pub fn find_city(id: &str) -> Option<&'static City> {
    CITY_REGISTRY.iter().find(|c| c.id == id)
}

/// Like `find_city`, but an unknown id is a configuration error.
pub fn lookup_city(id: &str) -> Result<&'static City, PrecipError> {
    find_city(id).ok_or_else(|| PrecipError::UnknownCity(id.to_string()))
}

/// Human-facing name for a city id.
///
/// Short ids are treated as abbreviations and upper-cased ("nyc" → "NYC");
/// longer ids are capitalized ("boston" → "Boston").
pub fn display_name(id: &str) -> String {
    if id.chars().count() <= 4 {
        return id.to_uppercase();
    }
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
