//! Error types for statboard
//!
//! Load failures are terminal for one invocation but never for the process:
//! every variant carries a message fit to show the user before re-prompting.

use crate::metric::Metric;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to produce raw records from a source
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Backing file does not exist
    #[error("Data file not found: {}\nCheck the path or upload a new file", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Source exists but could not be parsed (corrupt file, wrong sheet, missing columns)
    #[error("Unable to read {source_name}: {reason}")]
    Unreadable {
        /// Path or upload name
        source_name: String,
        /// What went wrong
        reason: String,
    },
}

impl DataLoadError {
    /// Build an `Unreadable` error for a named source
    pub fn unreadable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreadable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// statboard error types
#[derive(Error, Debug)]
pub enum Error {
    /// Source could not be loaded
    #[error(transparent)]
    Load(#[from] DataLoadError),

    /// Request violates a precondition (limit out of bounds, bad feature set)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Metric column is absent from the loaded dataset
    #[error("Metric '{}' is not available in this dataset", metric.column())]
    UnsupportedMetric {
        /// Requested metric
        metric: Metric,
    },

    /// No source selected yet
    #[error("No data source selected")]
    NoSource,

    /// Least-squares solve failed
    #[error("Regression error: {0}")]
    Regression(String),

    /// Configuration file could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Arrow/Parquet export error
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
