//! Error types for the K/π analysis workspace.

use thiserror::Error;

/// Workspace-wide error type.
///
/// `Io`, `Json`, `Schema` and `RecordSetNotFound` are fatal: they abort a
/// run before streaming starts. `ReadFailure` and `DegenerateCalibration`
/// are recoverable signals the pipeline logs and works around.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error opening or writing a container.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container is not parseable JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field or array is absent from the record schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// Named record set not present in the container.
    #[error("record set not found: {0}")]
    RecordSetNotFound(String),

    /// Entry index outside the record set.
    #[error("entry {index} out of range (record set has {entries} entries)")]
    OutOfRange {
        /// Requested entry index.
        index: usize,
        /// Number of entries in the record set.
        entries: usize,
    },

    /// A single record failed to materialize. Skip signal, not an abort.
    #[error("read failure at entry {index}: {reason}")]
    ReadFailure {
        /// Entry index that failed.
        index: usize,
        /// What went wrong.
        reason: String,
    },

    /// Confusion matrix unusable: no taggable tracks or tiny determinant.
    #[error("degenerate calibration: {0}")]
    DegenerateCalibration(String),
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
