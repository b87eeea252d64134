//! Statistics over an in-memory [`crate::types::RecordSet`].
//!
//! Currently implemented:
//!
//! - [`summarize()`]: whole-file summary ([`SummaryStat`])
//! - [`type_statistics()`] / [`type_distribution()`]: per-type-code grouping ([`TypeStat`])
//! - [`value_distribution()`]: fixed-width bucket histogram ([`DistributionBucket`])
//! - [`select_samples()`]: head/tail samples in file order
//!
//! [`compute_statistics()`] runs the first three together. Every function is total: an empty
//! record set produces zeroed / empty outputs, never an error.
//!
//! ## Example
//!
//! ```rust
//! use pool_report::ingestion::{parse_records, ParseOptions};
//! use pool_report::processing::{compute_statistics, StatsOptions};
//!
//! let parsed = parse_records("1800 TB2\n900 TB3\n515 TB2\n", &ParseOptions::default());
//! let stats = compute_statistics(&parsed.records, &StatsOptions::default());
//!
//! assert_eq!(stats.summary.total_records, 3);
//! assert_eq!(stats.type_distribution["TB2"], 2);
//! assert_eq!(stats.value_distribution.get("501-1000").map(|b| b.count), Some(2));
//! ```

pub mod by_type;
pub mod distribution;
pub mod sample;
pub mod summary;

use std::collections::BTreeMap;
use std::num::{NonZeroU64, NonZeroUsize};

use serde::Serialize;

use crate::types::RecordSet;

pub use by_type::{type_distribution, type_statistics, TypeStat};
pub use distribution::{value_distribution, DistributionBucket, ValueDistribution};
pub use sample::{select_samples, SampleData, SAMPLE_SIZE};
pub use summary::{summarize, SummaryStat};

/// Options for the statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    /// Width of each value bucket.
    pub bucket_width: NonZeroU64,
    /// Lower bound of the first bucket.
    pub bucket_start: i64,
    /// Largest number of buckets emitted densely (empty buckets included).
    pub max_buckets: NonZeroUsize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            bucket_width: NonZeroU64::new(500).unwrap_or(NonZeroU64::MIN),
            bucket_start: 0,
            max_buckets: NonZeroUsize::new(10_000).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// All statistics of one file, in report order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub summary: SummaryStat,
    pub type_distribution: BTreeMap<String, usize>,
    pub type_statistics: BTreeMap<String, TypeStat>,
    pub value_distribution: ValueDistribution,
}

/// Compute summary, per-type and value-distribution statistics.
///
/// Deterministic: the same record set always yields identical output.
pub fn compute_statistics(records: &RecordSet, options: &StatsOptions) -> Statistics {
    let type_statistics = type_statistics(records);
    Statistics {
        summary: summarize(records),
        type_distribution: type_distribution(&type_statistics),
        type_statistics,
        value_distribution: value_distribution(records, options),
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `100 * part / total`, 2 decimals; `0` when `total` is `0`.
pub(crate) fn percentage_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(100.0 * part as f64 / total as f64, 2)
}
