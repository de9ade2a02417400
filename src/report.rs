//! Report output for the monthly analysis.
//!
//! Two consumers: the chart renderer, which takes a `ChartPayload` (bar
//! positions, values and the statistics panel, already laid out so nothing
//! needs recomputing downstream), and the console, which gets a plain text
//! statistics table.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::MonthlyAnalysis;
use crate::model::{DEFAULT_UNIT, MonitorError, StatisticsSummary};
use crate::sampling_points::SamplingPoint;

/// Bars of the first indicator sit this many days before the month end,
/// the second this many after.
pub const BAR_OFFSET_DAYS: i64 = 7;

/// Bar width in days.
pub const BAR_WIDTH_DAYS: u32 = 15;

/// Placeholder for a statistic or value with no data.
pub const NO_DATA: &str = "-";

// ============================================================================
// Chart payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub months: Vec<MonthEntry>,
    pub series: Vec<BarSeries>,
    pub statistics: Vec<StatisticsSummary>,
    /// Text block shown beneath the chart, one line per statistic.
    pub statistics_panel: Vec<String>,
}

/// One x-axis tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthEntry {
    pub month_end: NaiveDate,
    /// Tick label, e.g. "Jul 2024".
    pub label: String,
    pub values: BTreeMap<String, Option<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub indicator: String,
    /// Legend entry, e.g. "Enterococo (UFC/100 mL)".
    pub label: String,
    pub offset_days: i64,
    pub width_days: u32,
    pub bars: Vec<Bar>,
}

/// A bar centred on `date`. A `None` value draws nothing; it is not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub value: Option<u32>,
}

impl ChartPayload {
    pub fn to_json(&self) -> Result<String, MonitorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Offset of the `index`-th indicator's bars from the month end: -7, +7,
/// then further 14-day steps so bars never overlap.
pub fn bar_offset_days(index: usize) -> i64 {
    -BAR_OFFSET_DAYS + 2 * BAR_OFFSET_DAYS * index as i64
}

/// Lays out the chart for one sampling point.
pub fn build_chart_payload(point: &SamplingPoint, analysis: &MonthlyAnalysis) -> ChartPayload {
    let months = analysis
        .buckets
        .iter()
        .map(|bucket| MonthEntry {
            month_end: bucket.month_end(),
            label: bucket.month_end().format("%b %Y").to_string(),
            values: bucket.values.clone(),
        })
        .collect();

    let series = analysis
        .indicators
        .iter()
        .enumerate()
        .map(|(index, indicator)| {
            let offset_days = bar_offset_days(index);
            let unit = point.unit_of(indicator).unwrap_or(DEFAULT_UNIT);
            BarSeries {
                indicator: indicator.clone(),
                label: format!("{} ({})", indicator, unit),
                offset_days,
                width_days: BAR_WIDTH_DAYS,
                bars: analysis
                    .buckets
                    .iter()
                    .map(|bucket| Bar {
                        date: bucket.month_end() + Duration::days(offset_days),
                        value: bucket.value(indicator),
                    })
                    .collect(),
            }
        })
        .collect();

    ChartPayload {
        title: point.name.clone(),
        months,
        series,
        statistics: analysis.statistics.clone(),
        statistics_panel: statistics_panel(&analysis.statistics),
    }
}

// ============================================================================
// Text output
// ============================================================================

const STATISTIC_LABELS: [&str; 5] = ["Mean", "Median", "Min", "Max", "Std"];

fn statistic_values(summary: &StatisticsSummary) -> [Option<f64>; 5] {
    [
        summary.mean,
        summary.median,
        summary.min,
        summary.max,
        summary.std_dev,
    ]
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{:.2}", v))
}

/// Panel lines such as `Mean: Escherichia coli=112.35, Enterococo=30.12`.
pub fn statistics_panel(statistics: &[StatisticsSummary]) -> Vec<String> {
    STATISTIC_LABELS
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let cells: Vec<String> = statistics
                .iter()
                .map(|s| format!("{}={}", s.indicator, format_value(statistic_values(s)[row])))
                .collect();
            format!("{}: {}", label, cells.join(", "))
        })
        .collect()
}

/// The console statistics table: one row per statistic, one column per
/// indicator. Missing statistics print as `-`.
pub fn format_statistics_table(analysis: &MonthlyAnalysis) -> String {
    let label_width = STATISTIC_LABELS.iter().map(|l| l.len()).max().unwrap_or(0);
    let widths: Vec<usize> = analysis
        .statistics
        .iter()
        .map(|s| s.indicator.len().max(10))
        .collect();

    let mut out = String::from("Statistics for Monthly Data:\n");

    out.push_str(&format!("{:label_width$}", ""));
    for (summary, &width) in analysis.statistics.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", summary.indicator));
    }
    out.push('\n');

    for (row, label) in STATISTIC_LABELS.iter().enumerate() {
        out.push_str(&format!("{:label_width$}", label));
        for (summary, &width) in analysis.statistics.iter().zip(&widths) {
            let cell = format_value(statistic_values(summary)[row]);
            out.push_str(&format!("  {:>width$}", cell));
        }
        out.push('\n');
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{INDICATOR_E_COLI, INDICATOR_ENTEROCOCCUS, IndicatorSeries, RawDataset};
    use crate::normalize::DuplicatePolicy;

    fn point() -> SamplingPoint {
        SamplingPoint {
            id: "PMX".to_string(),
            name: "Test point".to_string(),
            policy: DuplicatePolicy::MergeMax,
            dataset: RawDataset {
                dates: vec![
                    "16/02/2021".to_string(),
                    "08/02/2021".to_string(),
                    "18/01/2021".to_string(),
                ],
                indicators: vec![
                    IndicatorSeries {
                        name: INDICATOR_E_COLI.to_string(),
                        unit: DEFAULT_UNIT.to_string(),
                        readings: vec![Some(40), None, None],
                    },
                    IndicatorSeries {
                        name: INDICATOR_ENTEROCOCCUS.to_string(),
                        unit: DEFAULT_UNIT.to_string(),
                        readings: vec![Some(4), Some(5), Some(6)],
                    },
                ],
            },
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bar_offsets_straddle_month_end() {
        assert_eq!(bar_offset_days(0), -7);
        assert_eq!(bar_offset_days(1), 7);
        assert_eq!(bar_offset_days(2), 21);
    }

    #[test]
    fn test_payload_positions_bars_around_month_end() {
        let point = point();
        let analysis = point.analyze().unwrap();
        let payload = build_chart_payload(&point, &analysis);

        assert_eq!(payload.title, "Test point");
        assert_eq!(payload.months.len(), 2);
        assert_eq!(payload.months[0].month_end, date(2021, 1, 31));
        assert_eq!(payload.months[0].label, "Jan 2021");

        let e_coli = &payload.series[0];
        assert_eq!(e_coli.label, "Escherichia coli (UFC/100 mL)");
        assert_eq!(e_coli.bars[1].date, date(2021, 2, 21));
        assert_eq!(e_coli.bars[0].value, None, "January has no E. coli reading");

        let entero = &payload.series[1];
        assert_eq!(entero.bars[1].date, date(2021, 3, 7));
        assert_eq!(entero.bars[1].value, Some(5));
    }

    #[test]
    fn test_payload_json_uses_null_for_missing() {
        let point = point();
        let analysis = point.analyze().unwrap();
        let json = build_chart_payload(&point, &analysis).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["series"][0]["bars"][0]["value"], serde_json::Value::Null);
        assert_eq!(value["months"][0]["month_end"], "2021-01-31");
        // One E. coli month only: the n-1 deviation is undefined.
        assert_eq!(value["statistics"][0]["std_dev"], serde_json::Value::Null);
    }

    #[test]
    fn test_statistics_panel_lines() {
        let point = point();
        let analysis = point.analyze().unwrap();
        let panel = statistics_panel(&analysis.statistics);
        assert_eq!(panel.len(), 5);
        assert_eq!(panel[0], "Mean: Escherichia coli=40.00, Enterococo=5.50");
        assert_eq!(panel[4], "Std: Escherichia coli=-, Enterococo=0.71");
    }

    #[test]
    fn test_statistics_table_rows_align() {
        let point = point();
        let analysis = point.analyze().unwrap();
        let table = format_statistics_table(&analysis);
        let lines: Vec<&str> = table.lines().collect();

        // Title, header, then one row per statistic.
        assert_eq!(lines.len(), 2 + STATISTIC_LABELS.len());
        let header_width = lines[1].len();
        for line in &lines[2..] {
            assert_eq!(line.len(), header_width, "row {:?} should align with the header", line);
        }
        assert!(lines[6].starts_with("Std"));
        assert!(lines[6].contains(NO_DATA), "single E. coli month has no deviation");
    }

    #[test]
    fn test_statistics_table_lists_every_statistic() {
        let point = point();
        let analysis = point.analyze().unwrap();
        let table = format_statistics_table(&analysis);

        assert!(table.starts_with("Statistics for Monthly Data:"));
        for label in STATISTIC_LABELS {
            assert!(table.contains(label), "table should have a {} row", label);
        }
        assert!(table.contains(INDICATOR_E_COLI));
        assert!(table.contains(INDICATOR_ENTEROCOCCUS));
        assert!(table.contains("40.00"));
    }
}
