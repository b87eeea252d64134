//! Per-type-code statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::processing::{percentage_of, round_to};
use crate::types::RecordSet;

/// Statistics for one type code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeStat {
    pub count: usize,
    pub sum: i128,
    pub min: i64,
    pub max: i64,
    /// Mean, 2 decimals.
    pub avg: f64,
    /// Share of all records, 2 decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy)]
struct Acc {
    count: usize,
    sum: i128,
    min: i64,
    max: i64,
}

impl Acc {
    fn new(v: i64) -> Self {
        Self {
            count: 1,
            sum: i128::from(v),
            min: v,
            max: v,
        }
    }

    fn push(&mut self, v: i64) {
        self.count += 1;
        self.sum += i128::from(v);
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }
}

/// Group records by type code and compute a [`TypeStat`] for each group.
///
/// Keys are sorted, so serialization is deterministic.
pub fn type_statistics(records: &RecordSet) -> BTreeMap<String, TypeStat> {
    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        groups
            .entry(r.type_code.as_str())
            .and_modify(|acc| acc.push(r.value))
            .or_insert_with(|| Acc::new(r.value));
    }

    let total = records.len();
    groups
        .into_iter()
        .map(|(code, acc)| {
            let stat = TypeStat {
                count: acc.count,
                sum: acc.sum,
                min: acc.min,
                max: acc.max,
                avg: round_to(acc.sum as f64 / acc.count as f64, 2),
                percentage: percentage_of(acc.count, total),
            };
            (code.to_string(), stat)
        })
        .collect()
}

/// Compact type code → record count mapping, derived from [`type_statistics`] output.
pub fn type_distribution(stats: &BTreeMap<String, TypeStat>) -> BTreeMap<String, usize> {
    stats
        .iter()
        .map(|(code, stat)| (code.clone(), stat.count))
        .collect()
}
