//! Per-file report assembly.
//!
//! A [`Report`] combines externally supplied metadata with parser, statistics and sample output.
//! Its JSON shape is:
//!
//! ```text
//! {
//!   "metadata": {source_file, pool_type, pool_id, pool_variant, processed_at},
//!   "statistics": {summary, type_distribution, type_statistics, value_distribution},
//!   "sample_data": {first_10, last_10}
//! }
//! ```
//!
//! Field order and names are fixed; the struct field order below is the serialization order.

pub mod aggregate;
pub mod writer;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{PoolError, PoolResult};
use crate::ingestion::{parse_records, ParseOptions, ParseStats, PoolIdentifiers, SourceFile};
use crate::processing::{compute_statistics, select_samples, SampleData, Statistics, StatsOptions, SAMPLE_SIZE};

pub use aggregate::{aggregate_reports, AggregateSummary, FileError, RunSummary, ValueStats};
pub use writer::{report_output_path, write_csv_index, write_report, write_run_summary, IndexRow};

/// Metadata supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBundle {
    pub source_path: String,
    pub pool_type: Option<String>,
    pub pool_id: Option<String>,
    pub pool_variant: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl MetadataBundle {
    /// Build the bundle for a source file using the `Pool_<id>_<type>[_<variant>]` naming
    /// convention.
    pub fn for_source(source: &SourceFile, processed_at: DateTime<Utc>) -> Self {
        let ids = PoolIdentifiers::from_file_name(&source.file_name);
        Self {
            source_path: source.relative_path.clone(),
            pool_type: ids.pool_type,
            pool_id: ids.pool_id,
            pool_variant: ids.pool_variant,
            processed_at,
        }
    }
}

/// Validated report metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    pub source_file: String,
    pub pool_type: String,
    pub pool_id: String,
    pub pool_variant: Option<String>,
    /// RFC 3339, second precision.
    pub processed_at: String,
}

impl TryFrom<MetadataBundle> for ReportMetadata {
    type Error = PoolError;

    /// Fails with [`PoolError::InvalidMetadata`] if the source path, pool type or pool id is
    /// missing or blank.
    fn try_from(bundle: MetadataBundle) -> PoolResult<Self> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        let source_file = present(Some(bundle.source_path));
        let pool_type = present(bundle.pool_type);
        let pool_id = present(bundle.pool_id);

        match (source_file, pool_type, pool_id) {
            (Some(source_file), Some(pool_type), Some(pool_id)) => Ok(Self {
                source_file,
                pool_type,
                pool_id,
                pool_variant: present(bundle.pool_variant),
                processed_at: bundle.processed_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            }),
            (source_file, pool_type, pool_id) => {
                let missing: Vec<&str> = [
                    ("source_file", source_file.is_none()),
                    ("pool_type", pool_type.is_none()),
                    ("pool_id", pool_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect();
                Err(PoolError::InvalidMetadata {
                    message: format!(
                        "missing required field(s) {} for source '{}'",
                        missing.join(", "),
                        source_file.as_deref().unwrap_or("<unknown>")
                    ),
                })
            }
        }
    }
}

/// The complete per-file output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub statistics: Statistics,
    pub sample_data: SampleData,
}

/// Options for [`build_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub parse: ParseOptions,
    pub stats: StatsOptions,
    /// Records kept on each side of the sample. The JSON keys are always `first_10` and
    /// `last_10`, independent of this value.
    pub sample_size: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            stats: StatsOptions::default(),
            sample_size: SAMPLE_SIZE,
        }
    }
}

/// A report plus the parse diagnostics that are not part of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    pub report: Report,
    pub parse_stats: ParseStats,
}

/// Structural assembly of a report from already computed parts.
pub fn assemble_report(metadata: ReportMetadata, statistics: Statistics, sample_data: SampleData) -> Report {
    Report {
        metadata,
        statistics,
        sample_data,
    }
}

/// Parse `content`, compute statistics and samples, and assemble the report.
///
/// Metadata is validated first, so a bad bundle fails before any work is done. Malformed lines
/// never fail the call; they are counted in [`ReportOutput::parse_stats`].
///
/// ```rust
/// use chrono::Utc;
/// use pool_report::report::{build_report, MetadataBundle, ReportOptions};
///
/// # fn main() -> Result<(), pool_report::PoolError> {
/// let bundle = MetadataBundle {
///     source_path: "pools/Pool_0201_395.pol".to_string(),
///     pool_type: Some("395".to_string()),
///     pool_id: Some("0201".to_string()),
///     pool_variant: None,
///     processed_at: Utc::now(),
/// };
/// let out = build_report("1800 TB2\nabc XYZ\n900 TB3\n", bundle, &ReportOptions::default())?;
/// assert_eq!(out.report.statistics.summary.total_records, 2);
/// assert_eq!(out.parse_stats.records_skipped, 1);
/// # Ok(())
/// # }
/// ```
pub fn build_report(content: &str, metadata: MetadataBundle, options: &ReportOptions) -> PoolResult<ReportOutput> {
    let metadata = ReportMetadata::try_from(metadata)?;

    let parsed = parse_records(content, &options.parse);
    let statistics = compute_statistics(&parsed.records, &options.stats);
    let sample_data = select_samples(&parsed.records, options.sample_size);

    Ok(ReportOutput {
        report: assemble_report(metadata, statistics, sample_data),
        parse_stats: parsed.stats,
    })
}

/// Build the report for a source file read from disk.
pub fn process_source(source: &SourceFile, options: &ReportOptions, processed_at: DateTime<Utc>) -> PoolResult<ReportOutput> {
    build_report(&source.content, MetadataBundle::for_source(source, processed_at), options)
}
