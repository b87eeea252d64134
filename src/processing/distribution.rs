//! Fixed-width bucketed value distribution.
//!
//! Buckets are laid on a grid anchored at `bucket_start` with width `w`. Labels are inclusive on
//! both ends and buckets never overlap:
//!
//! | index | range |
//! |---|---|
//! | 0 | `start ..= start + w` |
//! | k > 0 | `start + k*w + 1 ..= start + (k+1)*w` |
//! | k < 0 | `start + k*w ..= start + (k+1)*w - 1` |
//!
//! With `w = 500, start = 0` this gives `0-500`, `501-1000`, `1001-1500`, ...: a value sitting on a
//! boundary belongs to the lower bucket. Values below `start` get the mirrored buckets
//! `-500--1`, `-1000--501`, ...

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::processing::{percentage_of, StatsOptions};
use crate::types::RecordSet;

/// One bucket of the value distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBucket {
    /// Inclusive lower bound.
    pub low: i128,
    /// Inclusive upper bound.
    pub high: i128,
    pub count: usize,
    /// Share of all records, 2 decimals.
    pub percentage: f64,
}

impl DistributionBucket {
    /// `"{low}-{high}"`.
    pub fn range_label(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

impl Serialize for DistributionBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DistributionBucket", 2)?;
        s.serialize_field("count", &self.count)?;
        s.serialize_field("percentage", &self.percentage)?;
        s.end()
    }
}

/// Ordered buckets, serialized as a `label -> {count, percentage}` object in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueDistribution(pub Vec<DistributionBucket>);

impl ValueDistribution {
    pub fn buckets(&self) -> &[DistributionBucket] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look a bucket up by its label.
    pub fn get(&self, label: &str) -> Option<&DistributionBucket> {
        self.0.iter().find(|b| b.range_label() == label)
    }
}

impl Serialize for ValueDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for b in &self.0 {
            map.serialize_entry(&b.range_label(), b)?;
        }
        map.end()
    }
}

/// Grid index of `value`.
pub fn bucket_index(value: i64, width: i128, start: i128) -> i128 {
    let d = i128::from(value) - start;
    if d > 0 {
        (d - 1) / width
    } else if d == 0 {
        0
    } else {
        d.div_euclid(width)
    }
}

/// Inclusive `(low, high)` bounds of grid bucket `index`.
pub fn bucket_bounds(index: i128, width: i128, start: i128) -> (i128, i128) {
    match index {
        0 => (start, start + width),
        k if k > 0 => (start + k * width + 1, start + (k + 1) * width),
        k => (start + k * width, start + (k + 1) * width - 1),
    }
}

/// Bucket every value.
///
/// Buckets run contiguously from the origin bucket (or the lowest occupied bucket, if lower) up
/// to the bucket holding the maximum, including empty ones. If that span exceeds
/// [`StatsOptions::max_buckets`], only occupied buckets are emitted. Empty input gives no buckets.
pub fn value_distribution(records: &RecordSet, options: &StatsOptions) -> ValueDistribution {
    if records.is_empty() {
        return ValueDistribution::default();
    }

    let width = i128::from(options.bucket_width.get());
    let start = i128::from(options.bucket_start);

    let mut counts: BTreeMap<i128, usize> = BTreeMap::new();
    for v in records.values() {
        *counts.entry(bucket_index(v, width, start)).or_default() += 1;
    }

    let total = records.len();
    let make = |idx: i128, count: usize| {
        let (low, high) = bucket_bounds(idx, width, start);
        DistributionBucket {
            low,
            high,
            count,
            percentage: percentage_of(count, total),
        }
    };

    // `counts` is non-empty here.
    let lowest = counts.keys().next().copied().unwrap_or(0).min(0);
    let highest = counts.keys().next_back().copied().unwrap_or(0).max(0);
    let span = highest - lowest + 1;

    let buckets = if span <= options.max_buckets.get() as i128 {
        (lowest..=highest)
            .map(|idx| make(idx, counts.get(&idx).copied().unwrap_or(0)))
            .collect()
    } else {
        warn!(
            span = %span,
            max_buckets = options.max_buckets.get(),
            "value range too wide for a dense distribution; emitting occupied buckets only"
        );
        counts.into_iter().map(|(idx, count)| make(idx, count)).collect()
    };

    ValueDistribution(buckets)
}

#[cfg(test)]
mod tests {
    use std::num::{NonZeroU64, NonZeroUsize};

    use super::{bucket_bounds, bucket_index, value_distribution};
    use crate::processing::StatsOptions;
    use crate::types::{Record, RecordSet};

    fn rs(values: &[i64]) -> RecordSet {
        values.iter().map(|&v| Record::new(v, "T")).collect()
    }

    fn labels(values: &[i64], opts: &StatsOptions) -> Vec<(String, usize)> {
        value_distribution(&rs(values), opts)
            .buckets()
            .iter()
            .map(|b| (b.range_label(), b.count))
            .collect()
    }

    #[test]
    fn boundary_value_belongs_to_lower_bucket() {
        let opts = StatsOptions::default();
        let dist = value_distribution(&rs(&[1000]), &opts);
        assert_eq!(dist.get("501-1000").map(|b| b.count), Some(1));
        assert!(dist.get("1001-1500").is_none());
    }

    #[test]
    fn grid_indexes_and_bounds() {
        for (v, idx) in [(0, 0), (1, 0), (500, 0), (501, 1), (1000, 1), (1001, 2), (-1, -1), (-500, -1), (-501, -2)] {
            assert_eq!(bucket_index(v, 500, 0), idx, "value {v}");
            let (lo, hi) = bucket_bounds(idx, 500, 0);
            assert!(i128::from(v) >= lo && i128::from(v) <= hi, "value {v} outside {lo}-{hi}");
        }
        assert_eq!(bucket_bounds(-1, 500, 0), (-500, -1));
    }

    #[test]
    fn dense_buckets_include_empty_ranges_up_to_max() {
        let out = labels(&[10, 1600], &StatsOptions::default());
        assert_eq!(
            out,
            vec![
                ("0-500".to_string(), 1),
                ("501-1000".to_string(), 0),
                ("1001-1500".to_string(), 0),
                ("1501-2000".to_string(), 1),
            ]
        );
    }

    #[test]
    fn reference_scenario_buckets() {
        let dist = value_distribution(&rs(&[1800, 900, 515, 715, 3810]), &StatsOptions::default());
        assert_eq!(dist.buckets().len(), 8);
        assert_eq!(dist.get("501-1000").map(|b| b.count), Some(3));
        assert_eq!(dist.get("1501-2000").map(|b| b.percentage), Some(20.0));
        assert_eq!(dist.get("3501-4000").map(|b| b.count), Some(1));
        assert_eq!(dist.buckets().iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn negative_values_extend_below_origin() {
        let out = labels(&[-20, 30], &StatsOptions::default());
        assert_eq!(out, vec![("-500--1".to_string(), 1), ("0-500".to_string(), 1)]);
    }

    #[test]
    fn custom_width_and_start() {
        let opts = StatsOptions {
            bucket_width: NonZeroU64::new(10).unwrap(),
            bucket_start: 100,
            ..StatsOptions::default()
        };
        let out = labels(&[100, 110, 111], &opts);
        assert_eq!(out, vec![("100-110".to_string(), 2), ("111-120".to_string(), 1)]);
    }

    #[test]
    fn sparse_fallback_when_span_exceeds_limit() {
        let opts = StatsOptions {
            max_buckets: NonZeroUsize::new(3).unwrap(),
            ..StatsOptions::default()
        };
        let out = labels(&[1, 1_000_000], &opts);
        assert_eq!(
            out,
            vec![("0-500".to_string(), 1), ("999501-1000000".to_string(), 1)]
        );
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(value_distribution(&RecordSet::default(), &StatsOptions::default()).is_empty());
    }

    #[test]
    fn serializes_as_ordered_label_map() {
        let dist = value_distribution(&rs(&[600, 100]), &StatsOptions::default());
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(
            json,
            r#"{"0-500":{"count":1,"percentage":50.0},"501-1000":{"count":1,"percentage":50.0}}"#
        );
    }
}
