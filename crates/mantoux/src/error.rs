//! Error types for the mantoux library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mantoux operations.
#[derive(Debug, Error)]
pub enum MantouxError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source unreachable, timed out, or malformed during load/refresh.
    #[error("Data load failed: {0}")]
    DataLoad(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Not enough values or records for the requested metric.
    #[error("Insufficient data for {what}: need at least {needed}, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    /// A metric denominator was zero (or otherwise outside its domain).
    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    /// Paired inputs differ in length.
    #[error("Shape mismatch: left has {left} values, right has {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// Unknown analysis type.
    #[error("Unsupported analysis type: '{0}'")]
    UnsupportedAnalysis(String),

    /// Invariant failure that should not happen in normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MantouxError {
    /// Stable machine-readable kind for this error, used by the HTTP
    /// boundary when building `{success: false, error: {kind, ...}}`
    /// envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            MantouxError::Io { .. } | MantouxError::DataLoad(_) | MantouxError::Csv(_) => {
                "data_load"
            }
            MantouxError::Json(_) => "serialization",
            MantouxError::InsufficientData { .. } => "insufficient_data",
            MantouxError::DivisionByZero(_) => "division_by_zero",
            MantouxError::ShapeMismatch { .. } => "shape_mismatch",
            MantouxError::UnsupportedAnalysis(_) => "unsupported_analysis",
            MantouxError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for mantoux operations.
pub type Result<T> = std::result::Result<T, MantouxError>;
