/// Structured logging for the bathing water monitoring service
///
/// Provides context-rich logging with pipeline stage and sampling point
/// identifiers. Events go through `tracing`; `init_logger` installs a
/// `tracing-subscriber` formatter on stderr and, optionally, a log file.

use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::model::MonitorError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Normalize,
    Aggregate,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Config => write!(f, "CFG"),
            Stage::Normalize => write!(f, "NORM"),
            Stage::Aggregate => write!(f, "AGG"),
            Stage::Report => write!(f, "RPT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// Calling this more than once is harmless; only the first call takes
/// effect. Fails only if `log_file` cannot be opened for appending.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), MonitorError> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(min_level, std::io::stderr.and(Mutex::new(file)), console_timestamps);
        }
        None => install(min_level, std::io::stderr, console_timestamps),
    }
    Ok(())
}

fn install<W>(min_level: LogLevel, writer: W, timestamps: bool)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_max_level(min_level.as_tracing())
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);

    // A subscriber may already be set (tests, repeated init); keep it.
    let _ = if timestamps {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

fn emit(level: LogLevel, stage: Stage, point_id: Option<&str>, message: &str) {
    let point = point_id.unwrap_or("-");
    match level {
        LogLevel::Debug => tracing::debug!(stage = %stage, point, "{}", message),
        LogLevel::Info => tracing::info!(stage = %stage, point, "{}", message),
        LogLevel::Warning => tracing::warn!(stage = %stage, point, "{}", message),
        LogLevel::Error => tracing::error!(stage = %stage, point, "{}", message),
    }
}

/// Log a general informational message
pub fn info(stage: Stage, point_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, stage, point_id, message);
}

/// Log a warning message
pub fn warn(stage: Stage, point_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, stage, point_id, message);
}

/// Log an error message
pub fn error(stage: Stage, point_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, stage, point_id, message);
}

/// Log a debug message
pub fn debug(stage: Stage, point_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, stage, point_id, message);
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log how many raw records collapsed into samples for one point.
pub fn log_normalization_summary(point_id: &str, raw_records: usize, samples: usize) {
    let merged = raw_records.saturating_sub(samples);
    let message = format!(
        "Normalized {} raw records into {} samples ({} merged)",
        raw_records, samples, merged
    );

    if samples == 0 {
        warn(Stage::Normalize, Some(point_id), &message);
    } else {
        info(Stage::Normalize, Some(point_id), &message);
    }
}

/// Log a fatal pipeline failure for one sampling point.
pub fn log_pipeline_failure(point_id: &str, stage: Stage, err: &dyn std::error::Error) {
    let message = format!("pipeline aborted: {}", err);
    error(stage, Some(point_id), &message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        level: LogLevel,
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_accepts_warn_and_warning() {
        let short: Wrapper = toml::from_str("level = \"warn\"").unwrap();
        let long: Wrapper = toml::from_str("level = \"warning\"").unwrap();
        assert_eq!(short.level, LogLevel::Warning);
        assert_eq!(long.level, LogLevel::Warning);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Normalize.to_string(), "NORM");
        assert_eq!(Stage::Aggregate.to_string(), "AGG");
        assert_eq!(Stage::Config.to_string(), "CFG");
        assert_eq!(Stage::Report.to_string(), "RPT");
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LogLevel::Debug, None, false).expect("first init");
        init_logger(LogLevel::Error, None, true).expect("second init keeps the first subscriber");
        info(Stage::Config, None, "logger initialised");
    }
}
