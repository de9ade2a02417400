//! Sampling record normalization.
//!
//! Turns a `RawDataset` (date strings plus ragged per-indicator reading
//! lists) into a chronologically ordered `Vec<Sample>`. Date parsing fails
//! fast: one malformed literal aborts the whole dataset, no partial output.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::{MonitorError, RawDataset, SAMPLE_DATE_FORMAT, Sample};

/// What to do with several raw records that share a sampling date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Collapse them into one sample holding the per-indicator maximum.
    MergeMax,
    /// Keep every record as its own sample, in input order within the day.
    KeepAll,
}

impl DuplicatePolicy {
    pub fn from_flag(deduplicate: bool) -> Self {
        if deduplicate {
            DuplicatePolicy::MergeMax
        } else {
            DuplicatePolicy::KeepAll
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing and padding
// ---------------------------------------------------------------------------

/// Parses a `DD/MM/YYYY` sampling date.
///
/// Day and month take one or two ASCII digits, the year exactly four.
/// Anything else, surrounding whitespace included, is a `ParseError`.
pub fn parse_sample_date(literal: &str) -> Result<NaiveDate, MonitorError> {
    let parse_error = || MonitorError::ParseError {
        literal: literal.to_string(),
    };

    let digits = |field: &str, min: usize, max: usize| {
        (min..=max).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
    };

    let fields: Vec<&str> = literal.split('/').collect();
    match fields.as_slice() {
        [day, month, year] if digits(*day, 1, 2) && digits(*month, 1, 2) && digits(*year, 4, 4) => {
            NaiveDate::parse_from_str(literal, SAMPLE_DATE_FORMAT).map_err(|_| parse_error())
        }
        _ => Err(parse_error()),
    }
}

/// Extends `readings` with missing values up to `len` entries.
///
/// Readings beyond `len` have no date to pair with and are dropped.
pub fn pad_readings(readings: &[Option<u32>], len: usize) -> Vec<Option<u32>> {
    let mut padded: Vec<Option<u32>> = readings.iter().copied().take(len).collect();
    padded.resize(len, None);
    padded
}

/// Per-indicator maximum that ignores missing values; missing only if both
/// sides are missing. `Option`'s ordering puts `None` below every `Some`.
pub fn max_reading(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    a.max(b)
}

/// An indicator whose reading list does not match the date list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub indicator: String,
    pub readings: usize,
    pub dates: usize,
}

impl LengthMismatch {
    /// Readings that have no date and are dropped by `normalize`.
    pub fn surplus(&self) -> usize {
        self.readings.saturating_sub(self.dates)
    }

    /// Missing values `normalize` appends to reach the date count.
    pub fn padding(&self) -> usize {
        self.dates.saturating_sub(self.readings)
    }
}

/// Indicators of `dataset` that `normalize` will pad or truncate.
pub fn length_mismatches(dataset: &RawDataset) -> Vec<LengthMismatch> {
    dataset
        .indicators
        .iter()
        .filter(|series| series.readings.len() != dataset.dates.len())
        .map(|series| LengthMismatch {
            indicator: series.name.clone(),
            readings: series.readings.len(),
            dates: dataset.dates.len(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Parses, pads and orders a raw dataset.
///
/// Every date is parsed before any sample is built, so a malformed date
/// returns `MonitorError::ParseError` without producing output.
pub fn normalize(dataset: &RawDataset, policy: DuplicatePolicy) -> Result<Vec<Sample>, MonitorError> {
    let dates = dataset
        .dates
        .iter()
        .map(|d| parse_sample_date(d))
        .collect::<Result<Vec<_>, _>>()?;

    let len = dates.len();
    let columns: Vec<(&str, Vec<Option<u32>>)> = dataset
        .indicators
        .iter()
        .map(|series| (series.name.as_str(), pad_readings(&series.readings, len)))
        .collect();

    let samples = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| Sample {
            date,
            readings: columns
                .iter()
                .map(|(name, values)| (name.to_string(), values[i]))
                .collect(),
        })
        .collect();

    Ok(normalize_samples(samples, policy))
}

/// Orders samples by date and applies the duplicate policy.
///
/// Already-normalized input comes back unchanged.
pub fn normalize_samples(mut samples: Vec<Sample>, policy: DuplicatePolicy) -> Vec<Sample> {
    match policy {
        DuplicatePolicy::KeepAll => {
            samples.sort_by_key(|s| s.date);
            samples
        }
        DuplicatePolicy::MergeMax => {
            let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, Option<u32>>> = BTreeMap::new();
            for sample in samples {
                let merged = by_date.entry(sample.date).or_default();
                for (indicator, value) in sample.readings {
                    let slot = merged.entry(indicator).or_insert(None);
                    *slot = max_reading(*slot, value);
                }
            }
            by_date
                .into_iter()
                .map(|(date, readings)| Sample { date, readings })
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
