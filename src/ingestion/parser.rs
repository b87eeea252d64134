//! `.pol` record parsing.
//!
//! Each non-blank line holds `<value> <type_code>`. Lines that don't match are skipped and
//! tallied in [`ParseStats`]; one bad line never loses the rest of the file.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PoolError, PoolResult};
use crate::types::{Record, RecordSet};

/// Upper bound on the skipped-line details kept per file. The count is always exact.
pub const MAX_SKIPPED_DETAILS: usize = 100;

/// How to treat a third token on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraValuePolicy {
    /// Any token beyond the type code makes the line malformed.
    #[default]
    Reject,
    /// Accept exactly one extra integer token and add it to the value.
    Fold,
}

/// Options controlling record parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Policy for `<value> <type_code> <extra>` lines.
    pub extra_value: ExtraValuePolicy,
}

/// One line that was skipped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// The raw line content.
    pub raw: String,
    /// Why the line was rejected.
    pub message: String,
}

/// Parsing diagnostics for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Non-blank lines seen.
    pub lines_read: usize,
    /// Lines that produced a record.
    pub records_parsed: usize,
    /// Lines skipped as malformed.
    pub records_skipped: usize,
    /// Details for the first [`MAX_SKIPPED_DETAILS`] skipped lines.
    pub skipped: Vec<SkippedLine>,
}

impl ParseStats {
    fn record_skip(&mut self, err: PoolError) {
        self.records_skipped += 1;
        if self.skipped.len() >= MAX_SKIPPED_DETAILS {
            return;
        }
        if let PoolError::MalformedRecord { line, raw, message } = err {
            self.skipped.push(SkippedLine { line, raw, message });
        }
    }
}

/// Output of [`parse_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    /// Valid records in file order.
    pub records: RecordSet,
    /// Skip diagnostics.
    pub stats: ParseStats,
}

/// Parse raw file content into a [`RecordSet`].
///
/// Rules:
///
/// - Blank (or whitespace-only) lines are ignored and not counted.
/// - Otherwise a line must be exactly two whitespace-separated tokens: an integer value and a
///   type code (used verbatim, case-sensitive).
/// - Malformed lines are skipped and counted in [`ParseStats::records_skipped`].
/// - Empty content yields an empty record set.
pub fn parse_records(content: &str, options: &ParseOptions) -> ParsedRecords {
    let mut records = Vec::new();
    let mut stats = ParseStats::default();

    for (idx0, raw) in content.lines().enumerate() {
        let line_no = idx0 + 1;
        match parse_line(line_no, raw, options) {
            Ok(None) => {}
            Ok(Some(record)) => {
                stats.lines_read += 1;
                stats.records_parsed += 1;
                records.push(record);
            }
            Err(err) => {
                stats.lines_read += 1;
                debug!(line = line_no, error = %err, "skipping malformed record");
                stats.record_skip(err);
            }
        }
    }

    if stats.records_skipped > 0 {
        warn!(
            skipped = stats.records_skipped,
            parsed = stats.records_parsed,
            "malformed lines skipped"
        );
    }

    ParsedRecords {
        records: RecordSet::new(records),
        stats,
    }
}

/// Parse a single line.
///
/// Returns `Ok(None)` for blank lines and [`PoolError::MalformedRecord`] for lines that do not
/// match the record format.
pub fn parse_line(line: usize, raw: &str, options: &ParseOptions) -> PoolResult<Option<Record>> {
    let mut tokens = raw.split_whitespace();
    let Some(value_tok) = tokens.next() else {
        return Ok(None);
    };
    let malformed = |message: String| PoolError::MalformedRecord {
        line,
        raw: raw.to_owned(),
        message,
    };

    let type_code = tokens
        .next()
        .ok_or_else(|| malformed("expected 2 tokens, found 1".to_string()))?;
    let mut value = value_tok
        .parse::<i64>()
        .map_err(|e| malformed(format!("value '{value_tok}' is not an integer: {e}")))?;

    let rest: Vec<&str> = tokens.collect();
    match (options.extra_value, rest.as_slice()) {
        (_, []) => {}
        (ExtraValuePolicy::Fold, [extra]) => {
            let extra = extra
                .parse::<i64>()
                .map_err(|e| malformed(format!("extra value '{extra}' is not an integer: {e}")))?;
            value = value
                .checked_add(extra)
                .ok_or_else(|| malformed("value + extra overflows i64".to_string()))?;
        }
        (_, extra) => {
            return Err(malformed(format!(
                "expected 2 tokens, found {}",
                2 + extra.len()
            )));
        }
    }

    Ok(Some(Record::new(value, type_code)))
}

#[cfg(test)]
mod tests {
    use super::{parse_line, parse_records, ExtraValuePolicy, ParseOptions, MAX_SKIPPED_DETAILS};
    use crate::error::PoolError;
    use crate::types::Record;

    fn strict() -> ParseOptions {
        ParseOptions::default()
    }

    fn folding() -> ParseOptions {
        ParseOptions {
            extra_value: ExtraValuePolicy::Fold,
        }
    }

    #[test]
    fn parses_two_token_lines_in_file_order() {
        let out = parse_records("1800 TB2\n900 TB3\n515 TB2\n", &strict());
        assert_eq!(
            out.records.as_slice(),
            &[
                Record::new(1800, "TB2"),
                Record::new(900, "TB3"),
                Record::new(515, "TB2"),
            ]
        );
        assert_eq!(out.stats.records_parsed, 3);
        assert_eq!(out.stats.records_skipped, 0);
    }

    #[test]
    fn tolerates_extra_whitespace_and_crlf() {
        let out = parse_records("  10\t\tA  \r\n\r\n20 B\r\n", &strict());
        assert_eq!(
            out.records.as_slice(),
            &[Record::new(10, "A"), Record::new(20, "B")]
        );
        assert_eq!(out.stats.lines_read, 2);
    }

    #[test]
    fn type_code_is_case_sensitive_and_verbatim() {
        let out = parse_records("1 tb2\n2 TB2\n", &strict());
        assert_eq!(out.records.as_slice()[0].type_code, "tb2");
        assert_eq!(out.records.as_slice()[1].type_code, "TB2");
    }

    #[test]
    fn skips_non_numeric_value_and_keeps_the_rest() {
        let out = parse_records("abc XYZ\n5 A\n", &strict());
        assert_eq!(out.records.as_slice(), &[Record::new(5, "A")]);
        assert_eq!(out.stats.records_skipped, 1);
        assert_eq!(out.stats.skipped[0].line, 1);
        assert_eq!(out.stats.skipped[0].raw, "abc XYZ");
    }

    #[test]
    fn rejects_single_token_and_extra_tokens_by_default() {
        let out = parse_records("5\n6 A 7\n8 B\n1.5 C\n", &strict());
        assert_eq!(out.records.as_slice(), &[Record::new(8, "B")]);
        assert_eq!(out.stats.records_skipped, 3);
        assert_eq!(
            out.stats.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
    }

    #[test]
    fn fold_policy_adds_extra_integer_token() {
        let out = parse_records("900 TB3 100\n515 TB2\n", &folding());
        assert_eq!(
            out.records.as_slice(),
            &[Record::new(1000, "TB3"), Record::new(515, "TB2")]
        );
    }

    #[test]
    fn fold_policy_still_rejects_non_integer_or_surplus_tokens() {
        let out = parse_records("1 A x\n1 A 2 3\n", &folding());
        assert!(out.records.is_empty());
        assert_eq!(out.stats.records_skipped, 2);
    }

    #[test]
    fn fold_overflow_is_malformed() {
        let line = format!("{} A 1", i64::MAX);
        let err = parse_line(1, &line, &folding()).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn empty_content_is_not_an_error() {
        let out = parse_records("", &strict());
        assert!(out.records.is_empty());
        assert_eq!(out.stats.lines_read, 0);

        let blank = parse_records("\n   \n\t\n", &strict());
        assert!(blank.records.is_empty());
        assert_eq!(blank.stats.records_skipped, 0);
    }

    #[test]
    fn parse_line_reports_line_number_and_raw() {
        let err = parse_line(42, "x y", &strict()).unwrap_err();
        match err {
            PoolError::MalformedRecord { line, raw, .. } => {
                assert_eq!(line, 42);
                assert_eq!(raw, "x y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skipped_details_are_capped_but_count_is_exact() {
        let content = "bad\n".repeat(MAX_SKIPPED_DETAILS + 5);
        let out = parse_records(&content, &strict());
        assert_eq!(out.stats.records_skipped, MAX_SKIPPED_DETAILS + 5);
        assert_eq!(out.stats.skipped.len(), MAX_SKIPPED_DETAILS);
    }
}
