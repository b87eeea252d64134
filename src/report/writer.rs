//! Writing reports and run artifacts to the output directory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::PoolResult;
use crate::report::{Report, ReportOutput, RunSummary};

/// File name of the run summary inside the output directory.
pub const RUN_SUMMARY_FILE: &str = "_pipeline_summary.json";
/// File name of the CSV index inside the output directory.
pub const CSV_INDEX_FILE: &str = "_all_files_summary.csv";

/// `<output_dir>/<relative_path>` with the extension replaced by `.json`.
pub fn report_output_path(output_dir: impl AsRef<Path>, relative_path: &str) -> PathBuf {
    output_dir.as_ref().join(relative_path).with_extension("json")
}

/// Write one report as pretty JSON, mirroring the source layout. Returns the written path.
pub fn write_report(output_dir: impl AsRef<Path>, relative_path: &str, report: &Report) -> PoolResult<PathBuf> {
    let path = report_output_path(output_dir, relative_path);
    write_json(&path, report)?;
    debug!(path = %path.display(), "wrote report");
    Ok(path)
}

/// Write [`RUN_SUMMARY_FILE`].
pub fn write_run_summary(output_dir: impl AsRef<Path>, summary: &RunSummary) -> PoolResult<PathBuf> {
    let path = output_dir.as_ref().join(RUN_SUMMARY_FILE);
    write_json(&path, summary)?;
    info!(path = %path.display(), "wrote run summary");
    Ok(path)
}

/// One row of the CSV index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRow {
    pub source_file: String,
    pub pool_id: String,
    pub pool_type: String,
    pub pool_variant: Option<String>,
    pub processed_at: String,
    pub total_records: usize,
    pub skipped_lines: usize,
    pub unique_types: usize,
    pub min_value: i64,
    pub max_value: i64,
    pub avg_value: f64,
}

impl From<&ReportOutput> for IndexRow {
    fn from(out: &ReportOutput) -> Self {
        let md = &out.report.metadata;
        let summary = &out.report.statistics.summary;
        Self {
            source_file: md.source_file.clone(),
            pool_id: md.pool_id.clone(),
            pool_type: md.pool_type.clone(),
            pool_variant: md.pool_variant.clone(),
            processed_at: md.processed_at.clone(),
            total_records: summary.total_records,
            skipped_lines: out.parse_stats.records_skipped,
            unique_types: summary.unique_types,
            min_value: summary.min_value,
            max_value: summary.max_value,
            avg_value: summary.avg_value,
        }
    }
}

/// Write [`CSV_INDEX_FILE`] with one row per report.
pub fn write_csv_index(output_dir: impl AsRef<Path>, rows: &[IndexRow]) -> PoolResult<PathBuf> {
    let dir = output_dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(CSV_INDEX_FILE);

    let mut wtr = csv::Writer::from_path(&path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = rows.len(), "wrote csv index");
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> PoolResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
