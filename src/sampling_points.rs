/// Sampling point registry for the Playa Jardin bathing water monitoring.
///
/// The canonical list of sampling points and their laboratory records is
/// kept in `data/sampling_points.toml` and compiled into the binary. This
/// is the single source of truth for point ids; other modules should look
/// points up here rather than hardcoding them.

use crate::analysis::{self, MonthlyAnalysis};
use crate::config::MonitorConfig;
use crate::logging::{self, Stage};
use crate::model::{MonitorError, RawDataset, Sample};
use crate::normalize::{self, DuplicatePolicy};

/// The monitoring resource shipped with the service.
pub const EMBEDDED_RESOURCE: &str = include_str!("../data/sampling_points.toml");

// ---------------------------------------------------------------------------
// Sampling point metadata
// ---------------------------------------------------------------------------

/// A single sampling point and its raw laboratory record.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingPoint {
    /// Short id, e.g. "PM1".
    pub id: String,
    /// Human-readable name, used as the chart title.
    pub name: String,
    /// How records sharing a sampling date are reconciled.
    pub policy: DuplicatePolicy,
    pub dataset: RawDataset,
}

impl SamplingPoint {
    /// Indicator names in the order the resource declares them.
    pub fn indicator_names(&self) -> Vec<String> {
        self.dataset.indicator_names()
    }

    /// Unit of `indicator`, if this point records it.
    pub fn unit_of(&self, indicator: &str) -> Option<&str> {
        self.dataset
            .indicators
            .iter()
            .find(|s| s.name == indicator)
            .map(|s| s.unit.as_str())
    }

    /// Normalizes the record, logging any indicator list that had to be
    /// padded or truncated to the date count.
    pub fn normalize(&self) -> Result<Vec<Sample>, MonitorError> {
        for mismatch in normalize::length_mismatches(&self.dataset) {
            if mismatch.surplus() > 0 {
                logging::warn(
                    Stage::Normalize,
                    Some(&self.id),
                    &format!(
                        "{}: dropping {} readings without a sampling date",
                        mismatch.indicator,
                        mismatch.surplus()
                    ),
                );
            } else {
                logging::debug(
                    Stage::Normalize,
                    Some(&self.id),
                    &format!(
                        "{}: padding {} missing readings",
                        mismatch.indicator,
                        mismatch.padding()
                    ),
                );
            }
        }
        normalize::normalize(&self.dataset, self.policy)
    }

    /// Normalizes the record and runs the monthly analysis on it.
    pub fn analyze(&self) -> Result<MonthlyAnalysis, MonitorError> {
        let samples = self.normalize()?;
        Ok(analysis::analyze(&samples, &self.indicator_names()))
    }
}

// ---------------------------------------------------------------------------
// Registry loading
// ---------------------------------------------------------------------------

/// Parses the embedded monitoring resource.
pub fn embedded_config() -> Result<MonitorConfig, MonitorError> {
    MonitorConfig::from_toml_str(EMBEDDED_RESOURCE)
}

/// Builds sampling points from a parsed resource, in declaration order.
pub fn from_config(config: &MonitorConfig) -> Result<Vec<SamplingPoint>, MonitorError> {
    config
        .sampling_points
        .iter()
        .map(|point| {
            Ok(SamplingPoint {
                id: point.id.clone(),
                name: point.name.clone(),
                policy: DuplicatePolicy::from_flag(point.deduplicate_dates),
                dataset: point.to_raw_dataset()?,
            })
        })
        .collect()
}

/// All sampling points of the embedded resource.
pub fn load_sampling_points() -> Result<Vec<SamplingPoint>, MonitorError> {
    from_config(&embedded_config()?)
}

/// Looks up a sampling point by id.
pub fn find_sampling_point<'a>(
    points: &'a [SamplingPoint],
    id: &str,
) -> Result<&'a SamplingPoint, MonitorError> {
    points
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| MonitorError::UnknownSamplingPoint(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
