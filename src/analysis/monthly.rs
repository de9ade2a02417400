//! Calendar-month bucketing.
//!
//! Samples are grouped by `(year, month)` and each indicator is reduced to
//! its maximum non-missing reading in the month. Only months that contain
//! at least one sample get a bucket; gaps in the record stay gaps.

use std::collections::BTreeMap;

use crate::model::{MonthKey, MonthlyBucket, Sample};
use crate::normalize::max_reading;

/// Groups `samples` into ascending monthly buckets for `indicators`.
///
/// Every bucket has an entry for every indicator; it is `None` when no
/// sample that month had a reading. Indicators not listed are ignored.
pub fn aggregate_monthly(samples: &[Sample], indicators: &[String]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<MonthKey, BTreeMap<String, Option<u32>>> = BTreeMap::new();

    for sample in samples {
        let values = months.entry(MonthKey::of(sample.date)).or_insert_with(|| {
            indicators.iter().map(|name| (name.clone(), None)).collect()
        });
        for name in indicators {
            if let Some(slot) = values.get_mut(name) {
                *slot = max_reading(*slot, sample.reading(name));
            }
        }
    }

    months
        .into_iter()
        .map(|(month, values)| MonthlyBucket { month, values })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{INDICATOR_E_COLI, INDICATOR_ENTEROCOCCUS};
    use chrono::NaiveDate;

    fn sample(y: i32, m: u32, d: u32, e_coli: Option<u32>, entero: Option<u32>) -> Sample {
        let mut readings = BTreeMap::new();
        readings.insert(INDICATOR_E_COLI.to_string(), e_coli);
        readings.insert(INDICATOR_ENTEROCOCCUS.to_string(), entero);
        Sample {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            readings,
        }
    }

    fn indicators() -> Vec<String> {
        vec![INDICATOR_E_COLI.to_string(), INDICATOR_ENTEROCOCCUS.to_string()]
    }

    #[test]
    fn test_bucket_holds_monthly_maximum() {
        let samples = vec![
            sample(2023, 10, 16, Some(110), Some(50)),
            sample(2023, 10, 23, Some(380), Some(40)),
            sample(2023, 10, 24, Some(290), Some(70)),
        ];
        let buckets = aggregate_monthly(&samples, &indicators());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].month, MonthKey { year: 2023, month: 10 });
        assert_eq!(buckets[0].value(INDICATOR_E_COLI), Some(380));
        assert_eq!(buckets[0].value(INDICATOR_ENTEROCOCCUS), Some(70));
    }

    #[test]
    fn test_missing_readings_are_ignored_in_the_maximum() {
        let samples = vec![
            sample(2021, 1, 18, None, Some(5)),
            sample(2021, 1, 25, Some(40), None),
        ];
        let buckets = aggregate_monthly(&samples, &indicators());
        assert_eq!(buckets[0].value(INDICATOR_E_COLI), Some(40));
        assert_eq!(buckets[0].value(INDICATOR_ENTEROCOCCUS), Some(5));
    }

    #[test]
    fn test_month_without_readings_is_missing_not_zero() {
        let samples = vec![
            sample(2021, 2, 8, None, Some(4)),
            sample(2021, 2, 16, None, Some(3)),
        ];
        let buckets = aggregate_monthly(&samples, &indicators());
        assert_eq!(buckets[0].values.get(INDICATOR_E_COLI), Some(&None));
    }

    #[test]
    fn test_sparse_months_get_no_synthetic_buckets() {
        // November 2022 is followed by January 2023 in the record.
        let samples = vec![
            sample(2023, 1, 23, Some(70), Some(19)),
            sample(2022, 11, 14, Some(260), Some(42)),
        ];
        let buckets = aggregate_monthly(&samples, &indicators());
        let months: Vec<_> = buckets.iter().map(|b| b.month).collect();
        assert_eq!(
            months,
            vec![MonthKey { year: 2022, month: 11 }, MonthKey { year: 2023, month: 1 }]
        );
    }

    #[test]
    fn test_bucket_is_dated_at_month_end() {
        let samples = vec![sample(2024, 2, 5, Some(90), Some(30))];
        let buckets = aggregate_monthly(&samples, &indicators());
        assert_eq!(buckets[0].month_end(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_no_samples_no_buckets() {
        assert!(aggregate_monthly(&[], &indicators()).is_empty());
    }
}
