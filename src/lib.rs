//! `pool-report` turns `.pol` pool files (one `<value> <type_code>` pair per line) into per-file
//! JSON statistics reports.
//!
//! The core is a pure transform engine:
//!
//! 1. [`ingestion::parse_records`] parses content into a [`types::RecordSet`], skipping and
//!    counting malformed lines.
//! 2. [`processing::compute_statistics`] derives summary, per-type and bucketed value
//!    distribution statistics; [`processing::select_samples`] extracts head/tail samples.
//! 3. [`report::build_report`] validates caller metadata and assembles a [`report::Report`].
//!
//! Around it sits thin I/O glue: discovery and reading ([`ingestion`]), parallel per-file
//! execution ([`execution`]), writing ([`report::writer`]) and the orchestrating
//! [`pipeline::run_pipeline`].
//!
//! ## Quick example
//!
//! ```rust
//! use chrono::Utc;
//! use pool_report::report::{build_report, MetadataBundle, ReportOptions};
//!
//! # fn main() -> Result<(), pool_report::PoolError> {
//! let content = "1800 TB2\n900 TB3\n515 TB2\n715 TB2\n3810 TB3\n";
//! let bundle = MetadataBundle {
//!     source_path: "pools/Pool_0201_395.pol".to_string(),
//!     pool_type: Some("395".to_string()),
//!     pool_id: Some("0201".to_string()),
//!     pool_variant: None,
//!     processed_at: Utc::now(),
//! };
//!
//! let out = build_report(content, bundle, &ReportOptions::default())?;
//! let summary = &out.report.statistics.summary;
//! assert_eq!(summary.total_records, 5);
//! assert_eq!(summary.total_sum, 7740);
//! assert_eq!(out.report.statistics.type_distribution["TB2"], 3);
//!
//! let json = serde_json::to_string_pretty(&out.report)?;
//! # let _ = json;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: record and record set
//! - [`ingestion`]: discovery, reading, naming convention, parsing
//! - [`processing`]: statistics engine and sample selector
//! - [`report`]: report assembly, run aggregates, writers
//! - [`execution`]: bounded parallel per-file engine
//! - [`pipeline`]: end-to-end run
//! - [`logging`]: subscriber setup for the binary
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod logging;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod types;

pub use error::{PoolError, PoolResult};
