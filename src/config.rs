//! Monitoring resource loading.
//!
//! The sampling datasets and the logging settings are kept in a TOML
//! resource rather than in code. The binary only ever reads the copy that
//! is compiled in (see `sampling_points`); `load_from_path` exists so the
//! same format can be checked or reused from elsewhere.

use crate::logging::LogLevel;
use crate::model::{DEFAULT_UNIT, IndicatorSeries, MonitorError, RawDataset};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Marker used in `readings` arrays for a sample without a reading.
pub const MISSING_MARKER: &str = "NA";

// ============================================================================
// Resource structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(rename = "sampling_point", default)]
    pub sampling_points: Vec<SamplingPointConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: LogLevel,
    /// Optional file that receives a copy of every log line.
    pub file: Option<String>,
    #[serde(default)]
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingPointConfig {
    pub id: String,
    pub name: String,
    /// Collapse records sharing a date into one sample before aggregation.
    #[serde(default = "default_true")]
    pub deduplicate_dates: bool,
    pub dates: Vec<String>,
    #[serde(rename = "indicator", default)]
    pub indicators: Vec<IndicatorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    pub name: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub readings: Vec<RawReading>,
}

/// A single entry of a `readings` array: a count or the `"NA"` marker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Count(i64),
    Marker(String),
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

fn default_true() -> bool {
    true
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

// ============================================================================
// Conversion
// ============================================================================

impl RawReading {
    /// Converts to an optional count. Negative counts, counts that do not
    /// fit a `u32` and unknown markers are rejected.
    pub fn to_reading(&self, indicator: &str, position: usize) -> Result<Option<u32>, MonitorError> {
        let invalid = |detail: String| MonitorError::InvalidReading {
            indicator: indicator.to_string(),
            position,
            detail,
        };

        match self {
            RawReading::Count(n) => u32::try_from(*n)
                .map(Some)
                .map_err(|_| invalid(format!("count {} is not a non-negative integer", n))),
            RawReading::Marker(m) if m.trim() == MISSING_MARKER => Ok(None),
            RawReading::Marker(m) => Err(invalid(format!(
                "unexpected marker '{}', expected a count or \"{}\"",
                m, MISSING_MARKER
            ))),
        }
    }
}

impl IndicatorConfig {
    pub fn to_series(&self) -> Result<IndicatorSeries, MonitorError> {
        let readings = self
            .readings
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_reading(&self.name, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IndicatorSeries {
            name: self.name.clone(),
            unit: self.unit.clone(),
            readings,
        })
    }
}

impl SamplingPointConfig {
    /// The raw records of this point, ready for the normalizer.
    pub fn to_raw_dataset(&self) -> Result<RawDataset, MonitorError> {
        let indicators = self
            .indicators
            .iter()
            .map(IndicatorConfig::to_series)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawDataset {
            dates: self.dates.clone(),
            indicators,
        })
    }
}

impl MonitorConfig {
    /// Parses and validates a monitoring resource.
    pub fn from_toml_str(contents: &str) -> Result<Self, MonitorError> {
        let config: MonitorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the structural rules serde cannot express: unique point ids,
    /// at least one indicator per point, unique indicator names per point.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let mut ids = HashSet::new();
        for point in &self.sampling_points {
            if point.id.trim().is_empty() {
                return Err(MonitorError::Config("sampling point with empty id".to_string()));
            }
            if !ids.insert(point.id.as_str()) {
                return Err(MonitorError::Config(format!(
                    "duplicate sampling point id '{}'",
                    point.id
                )));
            }
            if point.indicators.is_empty() {
                return Err(MonitorError::Config(format!(
                    "sampling point '{}' declares no indicators",
                    point.id
                )));
            }

            let mut names = HashSet::new();
            for indicator in &point.indicators {
                if !names.insert(indicator.name.as_str()) {
                    return Err(MonitorError::Config(format!(
                        "sampling point '{}' declares indicator '{}' twice",
                        point.id, indicator.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Reads and validates a monitoring resource from disk.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<MonitorConfig, MonitorError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    MonitorConfig::from_toml_str(&contents)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [[sampling_point]]
        id = "PMX"
        name = "Test point"
        dates = ["01/07/2024", "17/06/2024"]

        [[sampling_point.indicator]]
        name = "Escherichia coli"
        readings = [390, "NA"]
    "#;

    #[test]
    fn test_minimal_resource_uses_defaults() {
        let config = MonitorConfig::from_toml_str(MINIMAL).expect("minimal resource should parse");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.file.is_none());

        let point = &config.sampling_points[0];
        assert!(point.deduplicate_dates, "deduplication defaults to on");
        assert_eq!(point.indicators[0].unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_na_marker_becomes_missing_reading() {
        let config = MonitorConfig::from_toml_str(MINIMAL).unwrap();
        let raw = config.sampling_points[0].to_raw_dataset().unwrap();
        assert_eq!(raw.indicators[0].readings, vec![Some(390), None]);
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let err = RawReading::Count(-3).to_reading("Enterococo", 4).unwrap_err();
        match err {
            MonitorError::InvalidReading { indicator, position, .. } => {
                assert_eq!(indicator, "Enterococo");
                assert_eq!(position, 4);
            }
            other => panic!("expected InvalidReading, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_marker_is_rejected() {
        let result = RawReading::Marker("n/a".to_string()).to_reading("Enterococo", 0);
        assert!(result.is_err(), "only \"NA\" marks a missing reading");
    }

    #[test]
    fn test_duplicate_point_ids_are_rejected() {
        let doubled = format!("{}\n{}", MINIMAL, MINIMAL);
        let result = MonitorConfig::from_toml_str(&doubled);
        assert!(matches!(result, Err(MonitorError::Config(_))), "got {:?}", result);
    }

    #[test]
    fn test_point_without_indicators_is_rejected() {
        let resource = r#"
            [[sampling_point]]
            id = "PMX"
            name = "Empty"
            dates = ["01/07/2024"]
        "#;
        assert!(matches!(
            MonitorConfig::from_toml_str(resource),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn test_logging_table_is_read() {
        let resource = format!(
            "[logging]\nlevel = \"debug\"\nfile = \"bacmon.log\"\nconsole_timestamps = true\n{}",
            MINIMAL
        );
        let config = MonitorConfig::from_toml_str(&resource).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("bacmon.log"));
        assert!(config.logging.console_timestamps);
    }

    #[test]
    fn test_load_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load_from_path(file.path()).expect("resource on disk should load");
        assert_eq!(config.sampling_points.len(), 1);
        assert_eq!(config.sampling_points[0].id, "PMX");
    }

    #[test]
    fn test_load_from_missing_path_is_io_error() {
        let result = load_from_path("/nonexistent/sampling_points.toml");
        assert!(matches!(result, Err(MonitorError::Io(_))));
    }
}
