use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Error type covering the failures that can occur while reading the shipping
/// inputs, talking to the store, or driving a load run.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Wrapper for IO failures such as reading input or configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a CSV record cannot be read or decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the SQLite store.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Raised when the run report cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a configuration file is not valid TOML for the loader.
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Raised when configuration values are present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when a stage input (or a configuration file) does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a row is narrower than the fixed column layout of its file.
    #[error("{path}:{line}: expected at least {expected} columns, found {found}")]
    MissingColumn {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Raised in strict mode when a run completed with skipped or failed work.
    #[error("load run {run_id} finished with problems: {summary}")]
    StrictFailure { run_id: String, summary: String },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
