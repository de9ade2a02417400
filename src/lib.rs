//! Bathing water bacteriology monitoring.
//!
//! Loads laboratory sampling records for each sampling point, normalizes
//! them into one sample per date, aggregates the samples into monthly
//! maxima and summarizes the monthly series for reporting.

pub mod analysis;
pub mod config;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod report;
pub mod sampling_points;
