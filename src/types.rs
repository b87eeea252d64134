//! Core data model types.
//!
//! A source file parses into a [`RecordSet`]: an ordered list of [`Record`]s, one per valid
//! `<value> <type_code>` line, kept in file order.

use serde::{Deserialize, Serialize};

/// One parsed `(value, type_code)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Integer value from the first token.
    pub value: i64,
    /// Classification key from the second token, used verbatim (case-sensitive).
    pub type_code: String,
}

impl Record {
    /// Create a new record.
    pub fn new(value: i64, type_code: impl Into<String>) -> Self {
        Self {
            value,
            type_code: type_code.into(),
        }
    }
}

/// Records of a single source file, in file order.
///
/// Order matters for sample extraction ("first N" / "last N"); statistics never reorder the
/// underlying storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Create a record set from records already in file order.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no record was parsed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in file order.
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Iterate records in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Iterate values in file order.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.records.iter().map(|r| r.value)
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
