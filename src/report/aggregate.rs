//! Run-level summaries across every processed file.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::ingestion::classify_pool_type;
use crate::processing::round_to;
use crate::report::ReportOutput;

/// A file that could not be turned into a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// `min` / `max` / `avg` of a per-file metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Totals across all successful reports of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_files: usize,
    pub total_records: usize,
    pub total_skipped_lines: usize,
    /// Type code -> records across every file.
    pub type_code_totals: BTreeMap<String, usize>,
    /// Pool tag -> number of files carrying it.
    pub tags_distribution: BTreeMap<String, usize>,
    /// Parent folder -> number of files.
    pub files_by_folder: BTreeMap<String, usize>,
    /// Spread of `avg_value` over non-empty files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_value_stats: Option<ValueStats>,
    pub generated_at: String,
}

/// Written to `_pipeline_summary.json` at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub total_files_processed: usize,
    pub successful_transforms: usize,
    pub failed_transforms: usize,
    pub errors: Vec<FileError>,
    pub output_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<AggregateSummary>,
}

/// Fold per-file outputs into an [`AggregateSummary`].
///
/// `outputs` pairs each report with its parent folder name. Returns `None` for an empty run.
pub fn aggregate_reports<'a, I>(outputs: I, generated_at: DateTime<Utc>) -> Option<AggregateSummary>
where
    I: IntoIterator<Item = (&'a ReportOutput, &'a str)>,
{
    let mut total_files = 0usize;
    let mut total_records = 0usize;
    let mut total_skipped_lines = 0usize;
    let mut type_code_totals: BTreeMap<String, usize> = BTreeMap::new();
    let mut tags_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut files_by_folder: BTreeMap<String, usize> = BTreeMap::new();
    let mut avgs: Vec<f64> = Vec::new();

    for (out, folder) in outputs {
        let stats = &out.report.statistics;
        total_files += 1;
        total_records += stats.summary.total_records;
        total_skipped_lines += out.parse_stats.records_skipped;

        for (code, count) in &stats.type_distribution {
            *type_code_totals.entry(code.clone()).or_default() += count;
        }
        for tag in classify_pool_type(&out.report.metadata.pool_type).tags {
            *tags_distribution.entry(tag.to_string()).or_default() += 1;
        }
        *files_by_folder.entry(folder.to_string()).or_default() += 1;

        if stats.summary.total_records > 0 {
            avgs.push(stats.summary.avg_value);
        }
    }

    if total_files == 0 {
        return None;
    }

    let avg_value_stats = (!avgs.is_empty()).then(|| ValueStats {
        min: avgs.iter().copied().fold(f64::INFINITY, f64::min),
        max: avgs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: round_to(avgs.iter().sum::<f64>() / avgs.len() as f64, 2),
    });

    Some(AggregateSummary {
        total_files,
        total_records,
        total_skipped_lines,
        type_code_totals,
        tags_distribution,
        files_by_folder,
        avg_value_stats,
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, false),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::aggregate_reports;
    use crate::report::{build_report, MetadataBundle, ReportOptions, ReportOutput};

    fn output(pool_type: &str, content: &str) -> ReportOutput {
        let bundle = MetadataBundle {
            source_path: format!("Pool_1_{pool_type}.pol"),
            pool_type: Some(pool_type.to_string()),
            pool_id: Some("1".to_string()),
            pool_variant: None,
            processed_at: Utc::now(),
        };
        build_report(content, bundle, &ReportOptions::default()).unwrap()
    }

    #[test]
    fn aggregates_counts_tags_and_folders() {
        let a = output("395", "10 A\n20 B\nbad\n");
        let b = output("50001234", "30 A\n");
        let c = output("12", "");

        let agg = aggregate_reports([(&a, "x"), (&b, "x"), (&c, "y")], Utc::now()).unwrap();
        assert_eq!(agg.total_files, 3);
        assert_eq!(agg.total_records, 3);
        assert_eq!(agg.total_skipped_lines, 1);
        assert_eq!(agg.type_code_totals["A"], 2);
        assert_eq!(agg.type_code_totals["B"], 1);
        assert_eq!(agg.tags_distribution["PFB"], 2);
        assert_eq!(agg.tags_distribution["GAB"], 1);
        assert_eq!(agg.tags_distribution["REG"], 1);
        assert_eq!(agg.files_by_folder["x"], 2);

        let avg = agg.avg_value_stats.unwrap();
        assert_eq!(avg.min, 15.0);
        assert_eq!(avg.max, 30.0);
        assert_eq!(avg.avg, 22.5);
    }

    #[test]
    fn empty_run_has_no_aggregate() {
        assert!(aggregate_reports(std::iter::empty(), Utc::now()).is_none());
    }
}
