//! End-to-end run: discover `.pol` files, build a report per file in parallel, write the reports
//! plus a run summary.
//!
//! ```no_run
//! use pool_report::pipeline::{run_pipeline, PipelineConfig, ScanMode};
//!
//! # fn main() -> Result<(), pool_report::PoolError> {
//! let mut config = PipelineConfig::new("/path/to/repo");
//! config.mode = ScanMode::All;
//! let summary = run_pipeline(&config)?;
//! println!("{} ok, {} failed", summary.successful_transforms, summary.failed_transforms);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, info_span, warn};

use crate::error::PoolResult;
use crate::execution::{ExecutionEngine, ExecutionOptions, TracingExecutionObserver};
use crate::ingestion::{changed_pol_files, default_excluded_dirs, find_pol_files, find_pol_files_matching, SourceFile};
use crate::report::{
    aggregate_reports, process_source, write_csv_index, write_report, write_run_summary, FileError, IndexRow,
    ReportOptions, ReportOutput, RunSummary,
};

/// Default output directory name under the repository root.
pub const DEFAULT_OUTPUT_DIR: &str = "Meta_data";

/// Which files a run picks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// Every `.pol` file under the root.
    All,
    /// Only `.pol` files changed between two git revisions; falls back to [`ScanMode::All`] when
    /// git fails or reports no pool files.
    Changed { base: String, head: String },
}

impl Default for ScanMode {
    fn default() -> Self {
        Self::Changed {
            base: "HEAD~1".to_string(),
            head: "HEAD".to_string(),
        }
    }
}

/// Configuration for [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scan root; report paths are relative to it.
    pub repo_root: PathBuf,
    /// Where reports and run artifacts are written.
    pub output_dir: PathBuf,
    pub mode: ScanMode,
    /// Optional glob (relative to the root) restricting a full scan.
    pub pattern: Option<String>,
    /// Directory names never scanned.
    pub excluded_dirs: BTreeSet<String>,
    pub report: ReportOptions,
    pub execution: ExecutionOptions,
    /// Also write the CSV index.
    pub write_csv_index: bool,
}

impl PipelineConfig {
    /// Defaults rooted at `repo_root`, writing to `<repo_root>/Meta_data`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        Self {
            output_dir: repo_root.join(DEFAULT_OUTPUT_DIR),
            repo_root,
            mode: ScanMode::default(),
            pattern: None,
            excluded_dirs: default_excluded_dirs(),
            report: ReportOptions::default(),
            execution: ExecutionOptions::default(),
            write_csv_index: true,
        }
    }
}

/// A successfully transformed file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub relative_path: String,
    pub parent_folder: String,
    pub output: ReportOutput,
}

/// Nearest ancestor of `start` (inclusive) that contains a `.git` entry.
pub fn locate_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Select the files a run should process.
pub fn discover(config: &PipelineConfig) -> PoolResult<Vec<PathBuf>> {
    let full_scan = || match &config.pattern {
        Some(p) => find_pol_files_matching(&config.repo_root, p, &config.excluded_dirs),
        None => find_pol_files(&config.repo_root, &config.excluded_dirs),
    };

    match &config.mode {
        ScanMode::All => full_scan(),
        ScanMode::Changed { base, head } => {
            match changed_pol_files(&config.repo_root, base, head, &config.excluded_dirs) {
                Ok(files) if !files.is_empty() => Ok(files),
                Ok(_) => {
                    info!("no changed pool files detected, processing all files");
                    full_scan()
                }
                Err(e) => {
                    warn!(error = %e, "could not list changed files, processing all files");
                    full_scan()
                }
            }
        }
    }
}

/// Read one file and build its report.
pub fn transform_file(root: &Path, path: &Path, options: &ReportOptions) -> PoolResult<ProcessedFile> {
    let source = SourceFile::read(root, path)?;
    let output = process_source(&source, options, Utc::now())?;
    Ok(ProcessedFile {
        relative_path: source.relative_path.clone(),
        parent_folder: source.parent_folder().to_string(),
        output,
    })
}

/// Run discovery, transformation and loading. Per-file failures are recorded in the returned
/// summary; only setup errors and a failed summary write are returned as `Err`.
pub fn run_pipeline(config: &PipelineConfig) -> PoolResult<RunSummary> {
    info!(root = %config.repo_root.display(), output = %config.output_dir.display(), "starting pipeline");

    let paths = {
        let _span = info_span!("extract").entered();
        discover(config)?
    };
    info!(files = paths.len(), "files to process");

    let (processed, mut errors) = {
        let _span = info_span!("transform").entered();
        transform_all(config, &paths)?
    };
    info!(ok = processed.len(), failed = errors.len(), "transform finished");

    let _span = info_span!("load").entered();
    let mut written = Vec::with_capacity(processed.len());
    let mut output_files = Vec::with_capacity(processed.len());
    for file in processed {
        match write_report(&config.output_dir, &file.relative_path, &file.output.report) {
            Ok(path) => {
                output_files.push(display_relative(&config.repo_root, &path));
                written.push(file);
            }
            Err(e) => {
                error!(file = %file.relative_path, error = %e, "failed to write report");
                errors.push(FileError {
                    file: file.relative_path,
                    error: e.to_string(),
                });
            }
        }
    }
    info!(written = output_files.len(), "reports written");

    // Only files whose report exists count as successes or appear in the index.
    if config.write_csv_index && !written.is_empty() {
        let rows: Vec<IndexRow> = written.iter().map(|f| IndexRow::from(&f.output)).collect();
        write_csv_index(&config.output_dir, &rows)?;
    }

    let now = Utc::now();
    let summary = RunSummary {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, false),
        total_files_processed: paths.len(),
        successful_transforms: written.len(),
        failed_transforms: errors.len(),
        errors,
        output_files,
        aggregated: aggregate_reports(
            written.iter().map(|f| (&f.output, f.parent_folder.as_str())),
            now,
        ),
    };
    write_run_summary(&config.output_dir, &summary)?;

    info!("pipeline completed");
    Ok(summary)
}

fn transform_all(config: &PipelineConfig, paths: &[PathBuf]) -> PoolResult<(Vec<ProcessedFile>, Vec<FileError>)> {
    let engine = ExecutionEngine::new(config.execution.clone())?.with_observer(Arc::new(TracingExecutionObserver));
    let root = config.repo_root.as_path();

    let results = engine.run(
        paths,
        |p| display_relative(root, p),
        |p| transform_file(root, p, &config.report),
    );

    let mut processed = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(file) => {
                info!(file = %file.relative_path, records = file.output.report.statistics.summary.total_records, "transformed");
                processed.push(file);
            }
            Err(e) => {
                let file = display_relative(root, path);
                error!(file = %file, error = %e, "failed to transform");
                errors.push(FileError {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok((processed, errors))
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{discover, display_relative, locate_repo_root, PipelineConfig, ScanMode};

    #[test]
    fn repo_root_is_nearest_git_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(locate_repo_root(&nested).as_deref(), Some(dir.path()));
    }

    #[test]
    fn changed_mode_falls_back_to_full_scan_outside_git() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("p")).unwrap();
        fs::write(dir.path().join("p/Pool_1_395.pol"), "1 A\n").unwrap();

        let mut config = PipelineConfig::new(dir.path());
        config.mode = ScanMode::default();
        let files = discover(&config).unwrap();
        assert_eq!(files, vec![dir.path().join("p/Pool_1_395.pol")]);
    }

    #[test]
    fn relative_display_uses_forward_slashes() {
        let root = std::path::Path::new("/r");
        assert_eq!(display_relative(root, &root.join("a").join("Pool_1_2.pol")), "a/Pool_1_2.pol");
    }
}
