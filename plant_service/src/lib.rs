//! Drought plant precipitation service.
//!
//! Compares the last month of rainfall in a city against its historical
//! monthly averages and exposes the result as a deviation series, a summary
//! and a plant health value.

pub mod analysis;
pub mod cities;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod verify;
