/// Upstream data sources.
///
/// - `open_meteo`: daily precipitation sums from the Open-Meteo archive.

pub mod open_meteo;
