/// Monthly analysis of normalized samples.
///
/// Submodules:
/// - `monthly` — groups samples into calendar-month buckets (max per indicator).
/// - `statistics` — descriptive statistics across the monthly series.

pub mod monthly;
pub mod statistics;

use crate::model::{MonthlyBucket, Sample, StatisticsSummary};

/// Buckets plus per-indicator statistics for one sampling point.
///
/// `statistics` follows the order of the indicator list passed to
/// `analyze`, which is the order the resource declares them in.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAnalysis {
    pub indicators: Vec<String>,
    pub buckets: Vec<MonthlyBucket>,
    pub statistics: Vec<StatisticsSummary>,
}

impl MonthlyAnalysis {
    pub fn statistics_for(&self, indicator: &str) -> Option<&StatisticsSummary> {
        self.statistics.iter().find(|s| s.indicator == indicator)
    }
}

/// Runs the aggregation and statistics for `indicators` over `samples`.
///
/// Pure and deterministic: the same samples always give the same result.
pub fn analyze(samples: &[Sample], indicators: &[String]) -> MonthlyAnalysis {
    let buckets = monthly::aggregate_monthly(samples, indicators);
    let statistics = statistics::summarize_buckets(&buckets, indicators);
    MonthlyAnalysis {
        indicators: indicators.to_vec(),
        buckets,
        statistics,
    }
}
