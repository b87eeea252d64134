use thiserror::Error;

/// Convenience result type used across the crate.
pub type PoolResult<T> = Result<T, PoolError>;

/// Error type returned by parsing, report assembly, discovery and writing.
///
/// This is a single error enum shared by every stage of the pipeline.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV index writing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Directory traversal error during discovery.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid glob pattern passed to discovery.
    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A single line did not match the `<value> <type_code>` format.
    ///
    /// Whole-file parsing never returns this; it is tallied and skipped instead.
    #[error("malformed record at line {line}: {message} (raw='{raw}')")]
    MalformedRecord {
        line: usize,
        raw: String,
        message: String,
    },

    /// Caller-supplied metadata is missing a required identifier.
    #[error("invalid metadata: {message}")]
    InvalidMetadata { message: String },

    /// An option value is out of range.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// `git` could not report changed files.
    #[error("git error: {message}")]
    Git { message: String },
}
