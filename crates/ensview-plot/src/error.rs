//! Error types for ensview-plot
//!
//! Covers:
//! - Input validation for line bands and curves
//! - Unknown colormaps and output formats
//! - Backend availability and drawing failures

use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors raised while validating plot input or drawing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    /// Output format needs a backend that was not compiled in
    #[error("{format} output is unavailable: rebuild with the `{feature}` feature to enable it")]
    BackendUnavailable {
        format: &'static str,
        feature: &'static str,
    },

    /// Variance band is neither 1-D nor 2-D
    #[error("dy should be either 1-D or 2-D, got {ndim} dimensions")]
    InvalidBandDimensions { ndim: usize },

    /// Variance band shape does not fit the lines
    #[error("The shapes of dy and y do not match: dy is {rows}x{cols}, y has {points} points in {lines} lines")]
    BandShapeMismatch {
        rows: usize,
        cols: usize,
        points: usize,
        lines: usize,
    },

    /// Coordinate array does not match the data
    #[error("Length mismatch: expected {expected} values, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Nothing to draw
    #[error("No data to plot")]
    EmptyData,

    /// Percentile outside [0, 100]
    #[error("Percentile must lie within [0, 100], got {0}")]
    InvalidPercentile(f64),

    /// Colormap name not recognized
    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    /// Output file extension not recognized
    #[error("Unsupported output format for {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Drawing backend reported an error
    #[error("Drawing failed: {0}")]
    Backend(String),

    /// Output file could not be prepared
    #[error("I/O error: {0}")]
    Io(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Backend(err.to_string())
    }
}

impl From<std::io::Error> for PlotError {
    fn from(err: std::io::Error) -> Self {
        PlotError::Io(err.to_string())
    }
}

/// Result type alias for plotting operations
pub type PlotResult<T> = Result<T, PlotError>;
