use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use pool_report::execution::ExecutionOptions;
use pool_report::ingestion::{ExtraValuePolicy, ParseOptions};
use pool_report::logging::{init_logging, LogConfig, LogFormat};
use pool_report::pipeline::{locate_repo_root, run_pipeline, PipelineConfig, ScanMode};
use pool_report::processing::{StatsOptions, SAMPLE_SIZE};
use pool_report::report::ReportOptions;

/// Build per-file JSON statistics reports for `.pol` pool files.
#[derive(Debug, Parser)]
#[command(name = "pool-report", version, about)]
struct Cli {
    /// Repository root to scan. Defaults to the nearest ancestor containing `.git`.
    #[arg(long, env = "GITHUB_WORKSPACE")]
    root: Option<PathBuf>,

    /// Output directory. Defaults to `<root>/Meta_data`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Process every `.pol` file instead of only those changed in the last commit.
    #[arg(long)]
    all: bool,

    /// Base revision for change detection.
    #[arg(long, default_value = "HEAD~1", conflicts_with = "all")]
    base: String,

    /// Head revision for change detection.
    #[arg(long, default_value = "HEAD", conflicts_with = "all")]
    head: String,

    /// Glob (relative to the root) restricting which files a full scan picks up.
    #[arg(long)]
    pattern: Option<String>,

    /// Worker threads. Defaults to available parallelism.
    #[arg(long)]
    threads: Option<usize>,

    /// Maximum files held in memory at once.
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Width of each value-distribution bucket.
    #[arg(long, default_value = "500")]
    bucket_width: NonZeroU64,

    /// Lower bound of the first value-distribution bucket.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    bucket_start: i64,

    /// Maximum number of dense buckets before falling back to occupied buckets only.
    #[arg(long, default_value = "10000")]
    max_buckets: NonZeroUsize,

    /// Records kept on each side of the sample. The report keys stay `first_10` / `last_10`
    /// whatever the size.
    #[arg(long, default_value_t = SAMPLE_SIZE)]
    sample_size: usize,

    /// Accept `<value> <type> <extra>` lines, adding `extra` to the value.
    #[arg(long)]
    fold_extra_value: bool,

    /// Skip writing the CSV index.
    #[arg(long)]
    no_csv: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Disable ANSI colors in log output.
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir().context("reading current directory")?;
                locate_repo_root(&cwd).unwrap_or(cwd)
            }
        };

        let mut config = PipelineConfig::new(root);
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        config.mode = if self.all {
            ScanMode::All
        } else {
            ScanMode::Changed {
                base: self.base,
                head: self.head,
            }
        };
        config.pattern = self.pattern;
        config.write_csv_index = !self.no_csv;
        config.report = ReportOptions {
            parse: ParseOptions {
                extra_value: if self.fold_extra_value {
                    ExtraValuePolicy::Fold
                } else {
                    ExtraValuePolicy::Reject
                },
            },
            stats: StatsOptions {
                bucket_width: self.bucket_width,
                bucket_start: self.bucket_start,
                max_buckets: self.max_buckets,
            },
            sample_size: self.sample_size,
        };

        let defaults = ExecutionOptions::default();
        config.execution = ExecutionOptions {
            num_threads: self.threads.or(defaults.num_threads),
            max_in_flight_files: self.max_in_flight.unwrap_or(defaults.max_in_flight_files),
        };
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(!cli.no_color);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("failed to initialise logging: {e}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.into_config()?;
    let summary = run_pipeline(&config)
        .with_context(|| format!("running pipeline under {}", config.repo_root.display()))?;

    info!(
        files = summary.total_files_processed,
        ok = summary.successful_transforms,
        failed = summary.failed_transforms,
        "done"
    );
    if summary.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(errors = summary.errors.len(), "some files failed");
        Ok(ExitCode::from(2))
    }
}
