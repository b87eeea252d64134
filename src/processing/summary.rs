//! Whole-file summary statistics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::processing::round_to;
use crate::types::RecordSet;

/// Aggregate over every record of a file.
///
/// For an empty record set every numeric field is `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub total_records: usize,
    pub total_sum: i128,
    pub min_value: i64,
    pub max_value: i64,
    /// Mean, 2 decimals.
    pub avg_value: f64,
    /// Median, 1 decimal. Mean of the two central values for even counts.
    pub median_value: f64,
    /// Population standard deviation (divides by N), 2 decimals.
    pub std_deviation: f64,
    pub unique_types: usize,
}

/// Compute the [`SummaryStat`] of a record set.
pub fn summarize(records: &RecordSet) -> SummaryStat {
    if records.is_empty() {
        return SummaryStat::default();
    }

    let n = records.len();
    let mut sorted: Vec<i64> = records.values().collect();
    sorted.sort_unstable();

    let total_sum: i128 = sorted.iter().map(|&v| i128::from(v)).sum();
    let mean = total_sum as f64 / n as f64;

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    } else {
        sorted[n / 2] as f64
    };

    let variance = sorted
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;

    let unique_types = records
        .iter()
        .map(|r| r.type_code.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    SummaryStat {
        total_records: n,
        total_sum,
        min_value: sorted[0],
        max_value: sorted[n - 1],
        avg_value: round_to(mean, 2),
        median_value: round_to(median, 1),
        std_deviation: round_to(variance.sqrt(), 2),
        unique_types,
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize, SummaryStat};
    use crate::types::{Record, RecordSet};

    fn rs(values: &[(i64, &str)]) -> RecordSet {
        values.iter().map(|&(v, t)| Record::new(v, t)).collect()
    }

    #[test]
    fn summary_of_reference_scenario() {
        let s = summarize(&rs(&[
            (1800, "TB2"),
            (900, "TB3"),
            (515, "TB2"),
            (715, "TB2"),
            (3810, "TB3"),
        ]));
        assert_eq!(s.total_records, 5);
        assert_eq!(s.total_sum, 7740);
        assert_eq!(s.min_value, 515);
        assert_eq!(s.max_value, 3810);
        assert_eq!(s.avg_value, 1548.0);
        assert_eq!(s.median_value, 900.0);
        assert_eq!(s.unique_types, 2);
        // population sd of [515, 715, 900, 1800, 3810] around 1548
        assert_eq!(s.std_deviation, 1213.34);
    }

    #[test]
    fn median_of_even_count_averages_central_values() {
        let s = summarize(&rs(&[(4, "A"), (1, "A"), (3, "A"), (2, "A")]));
        assert_eq!(s.median_value, 2.5);
        assert_eq!(s.avg_value, 2.5);
        assert_eq!(s.std_deviation, 1.12);
    }

    #[test]
    fn single_record_has_zero_deviation() {
        let s = summarize(&rs(&[(-7, "Z")]));
        assert_eq!(s.min_value, -7);
        assert_eq!(s.max_value, -7);
        assert_eq!(s.median_value, -7.0);
        assert_eq!(s.std_deviation, 0.0);
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        assert_eq!(summarize(&RecordSet::default()), SummaryStat::default());
    }

    #[test]
    fn sum_does_not_overflow_i64() {
        let s = summarize(&rs(&[(i64::MAX, "A"), (i64::MAX, "A")]));
        assert_eq!(s.total_sum, 2 * i128::from(i64::MAX));
    }
}
