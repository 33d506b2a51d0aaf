/// Pure computations over fetched precipitation data.
///
/// Nothing in this module performs I/O; every function is a deterministic
/// function of its arguments.
///
/// Submodules:
/// - `deviation`: per-day seasonal baseline and running totals.
/// - `presentation`: health percentage, plant water level and chart series.

pub mod deviation;
pub mod presentation;
