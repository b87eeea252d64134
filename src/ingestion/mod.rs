//! Ingestion: finding, reading and parsing `.pol` source files.
//!
//! - [`discovery`]: locate source files under a scan root (walk, glob, or git changes)
//! - [`source`]: read one file fully into memory as a [`SourceFile`]
//! - [`naming`]: derive pool identifiers from the file name
//! - [`parser`]: turn content into a [`crate::types::RecordSet`]

pub mod discovery;
pub mod naming;
pub mod parser;
pub mod source;

pub use discovery::{changed_pol_files, default_excluded_dirs, find_pol_files, find_pol_files_matching};
pub use naming::{classify_pool_type, PoolClassification, PoolIdentifiers};
pub use parser::{parse_line, parse_records, ExtraValuePolicy, ParseOptions, ParseStats, ParsedRecords, SkippedLine};
pub use source::SourceFile;
