/// Core data types for the bathing water monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small accessors, no I/O, and only the
/// dependencies needed to describe dates and errors.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Indicator names
// ---------------------------------------------------------------------------

/// Primary fecal-indicator bacterium, in colony-forming units per 100 mL.
pub const INDICATOR_E_COLI: &str = "Escherichia coli";

/// Secondary fecal indicator (intestinal enterococci), in UFC/100 mL.
pub const INDICATOR_ENTEROCOCCUS: &str = "Enterococo";

/// Unit reported by the laboratory for both indicators.
pub const DEFAULT_UNIT: &str = "UFC/100 mL";

/// Date format used by the sampling records, e.g. "24/05/2021".
pub const SAMPLE_DATE_FORMAT: &str = "%d/%m/%Y";

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// The readings of one indicator, positionally paired with
/// `RawDataset::dates`. May be shorter than the date list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSeries {
    pub name: String,
    pub unit: String,
    pub readings: Vec<Option<u32>>,
}

/// Sampling records exactly as the laboratory listed them: unsorted,
/// possibly with repeated dates and ragged indicator lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    pub dates: Vec<String>,
    pub indicators: Vec<IndicatorSeries>,
}

impl RawDataset {
    pub fn indicator_names(&self) -> Vec<String> {
        self.indicators.iter().map(|s| s.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Sample types
// ---------------------------------------------------------------------------

/// One sampling day at a sampling point.
///
/// `readings` maps indicator name to the count taken that day. `None` is an
/// explicit absence of a reading and is never the same as a zero count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub date: NaiveDate,
    pub readings: BTreeMap<String, Option<u32>>,
}

impl Sample {
    /// Reading for `indicator`, flattening "indicator not recorded" and
    /// "reading missing" into the same `None`.
    pub fn reading(&self, indicator: &str) -> Option<u32> {
        self.readings.get(indicator).copied().flatten()
    }
}

/// Calendar month used as the grouping key for monthly aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Last calendar day of the month. Buckets are plotted at this date,
    /// following the month-end resampling convention.
    pub fn month_end(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

/// The maximum reading per indicator over all samples in one month.
///
/// Produced by `analysis::monthly::aggregate_monthly`. A value is `None`
/// when no sample in the month carried a reading for that indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBucket {
    pub month: MonthKey,
    pub values: BTreeMap<String, Option<u32>>,
}

impl MonthlyBucket {
    pub fn value(&self, indicator: &str) -> Option<u32> {
        self.values.get(indicator).copied().flatten()
    }

    pub fn month_end(&self) -> NaiveDate {
        self.month.month_end()
    }
}

// ---------------------------------------------------------------------------
// Statistics types
// ---------------------------------------------------------------------------

/// Descriptive statistics of one indicator across the monthly series.
///
/// All five figures are `None` when the indicator has no non-missing
/// monthly values. `std_dev` is also `None` with a single value, since the
/// n-1 estimator is undefined there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub indicator: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while loading or normalizing sampling data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// A sampling date did not match DD/MM/YYYY. Fatal for the whole run.
    #[error("Parse error: date '{literal}' does not match DD/MM/YYYY")]
    ParseError { literal: String },

    /// A reading in the resource was neither a count nor the "NA" marker.
    #[error("Invalid reading for {indicator} at position {position}: {detail}")]
    InvalidReading {
        indicator: String,
        position: usize,
        detail: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Unknown sampling point: {0}")]
    UnknownSamplingPoint(String),
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for MonitorError {
    fn from(err: toml::de::Error) -> Self {
        MonitorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Io(err.to_string())
    }
}
