//! Descriptive statistics over a monthly series.

use crate::model::{MonthlyBucket, StatisticsSummary};

/// Mean, median, min, max and sample standard deviation of `values`,
/// skipping missing entries.
///
/// The standard deviation uses the unbiased n-1 divisor and is `None` for
/// fewer than two values. With no values at all every figure is `None`.
pub fn summarize(indicator: &str, values: &[Option<u32>]) -> StatisticsSummary {
    let mut present: Vec<f64> = values.iter().flatten().map(|&v| f64::from(v)).collect();
    present.sort_by(f64::total_cmp);

    let count = present.len();
    if count == 0 {
        return StatisticsSummary {
            indicator: indicator.to_string(),
            count,
            mean: None,
            median: None,
            min: None,
            max: None,
            std_dev: None,
        };
    }

    let mean = present.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (present[count / 2 - 1] + present[count / 2]) / 2.0
    } else {
        present[count / 2]
    };
    let std_dev = (count > 1).then(|| {
        let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    StatisticsSummary {
        indicator: indicator.to_string(),
        count,
        mean: Some(mean),
        median: Some(median),
        min: present.first().copied(),
        max: present.last().copied(),
        std_dev,
    }
}

/// One summary per indicator, in the order given.
pub fn summarize_buckets(buckets: &[MonthlyBucket], indicators: &[String]) -> Vec<StatisticsSummary> {
    indicators
        .iter()
        .map(|name| {
            let series: Vec<Option<u32>> = buckets.iter().map(|b| b.value(name)).collect();
            summarize(name, &series)
        })
        .collect()
}
