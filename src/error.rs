//! Error types for loading and assembling financial data.

use std::path::PathBuf;

/// Errors that can occur while reading data files or querying a data source.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The data file does not exist.
    #[error("missing data file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A required column is not present in the file header.
    #[error("missing column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A row could not be parsed as a date and numeric values.
    #[error("parse error in {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// The CSV reader failed.
    #[error("csv error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An I/O error other than a missing file.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested series is not available from an in-memory source.
    #[error("data not found: {0}")]
    NotFound(String),
}

impl DataError {
    /// Returns true if the error means the data does not exist at all,
    /// as opposed to existing but being malformed.
    pub fn is_missing(&self) -> bool {
        matches!(self, DataError::MissingFile { .. } | DataError::NotFound(_))
    }
}
