//! Head/tail sample extraction.

use serde::{Deserialize, Serialize};

use crate::types::{Record, RecordSet};

/// Default number of records kept on each side.
pub const SAMPLE_SIZE: usize = 10;

/// First and last records of a file, verbatim and in file order.
///
/// When the file has fewer than `2 * k` records the two windows overlap; they are not
/// deduplicated. The serialized keys are fixed at `first_10` / `last_10` for any `k`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleData {
    #[serde(rename = "first_10")]
    pub first: Vec<Record>,
    #[serde(rename = "last_10")]
    pub last: Vec<Record>,
}

/// Take up to `k` records from the start and up to `k` from the end of `records`.
pub fn select_samples(records: &RecordSet, k: usize) -> SampleData {
    let all = records.as_slice();
    let head = k.min(all.len());
    let tail_start = all.len().saturating_sub(k);
    SampleData {
        first: all[..head].to_vec(),
        last: all[tail_start..].to_vec(),
    }
}
