//! Error types for ensview-io

use ensview_tree::TreeError;
use thiserror::Error;

/// Errors that can occur while reading or writing data files
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// File has no data rows
    #[error("No data in {0}")]
    Empty(String),

    /// A row has a different number of cells than the first one
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A cell does not hold a number
    #[error("Row {row}, column {column}: '{value}' is not a number")]
    NotNumeric {
        row: usize,
        column: usize,
        value: String,
    },

    /// Label count does not fit the matrix
    #[error("{labels} labels for {columns} columns")]
    LabelCount { labels: usize, columns: usize },

    #[error("Invalid tree: {0}")]
    Tree(#[from] TreeError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err.to_string())
    }
}

impl From<csv::Error> for IoError {
    fn from(err: csv::Error) -> Self {
        IoError::InvalidFormat(err.to_string())
    }
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;
