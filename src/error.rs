use std::path::PathBuf;

use thiserror::Error;

/// Failures the labeling core can report.
///
/// Cursor movement never produces an error; out-of-range navigation is
/// clamped by the session state machine instead.
#[derive(Debug, Error)]
pub enum LabelerError {
    #[error("period must be positive, got {period}")]
    InvalidPeriod { period: f64 },

    #[error("light curve {} unavailable: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("catalog lists {files} files but {periods} periods")]
    SchemaMismatch { files: usize, periods: usize },

    #[error("label snapshot rejected: {0}")]
    CorruptSnapshot(String),

    #[error("index {index} outside catalog of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type LabelerResult<T> = Result<T, LabelerError>;
