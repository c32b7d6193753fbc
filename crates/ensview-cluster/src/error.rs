//! Error types for ensview-cluster

use thiserror::Error;

/// Errors raised while condensing or clustering a matrix
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Neither a distance nor a similarity matrix was supplied
    #[error("Please provide a distance matrix or a similarity matrix")]
    MissingMatrix,

    /// Matrix is not square
    #[error("Distance matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Distance matrix has a non-zero diagonal entry
    #[error("Distance matrix diagonal must be zero, found {value} at index {index}")]
    NonZeroDiagonal { index: usize, value: f64 },

    /// Distance matrix is not symmetric
    #[error("Distance matrix must be symmetric, entries ({i}, {j}) and ({j}, {i}) differ")]
    Asymmetric { i: usize, j: usize },

    /// Condensed form has a length that is not n(n-1)/2 for any n
    #[error("Condensed distance array of length {0} does not describe a square matrix")]
    InvalidCondensedLength(usize),

    /// Clustering needs at least two observations
    #[error("At least two observations are required for clustering, got {0}")]
    TooFewObservations(usize),

    /// Distances contain NaN or infinity
    #[error("The condensed distance matrix must contain only finite values")]
    NonFinite,

    /// Labels do not match the matrix
    #[error("Expected {size} labels, got {labels}")]
    LabelCountMismatch { labels: usize, size: usize },

    /// Observation index outside the matrix
    #[error("Observation {index} is out of range for {observations} observations")]
    ObservationOutOfRange { index: usize, observations: usize },

    /// Linkage and distances describe different numbers of observations
    #[error("Linkage covers {linkage} observations but the distances cover {distances}")]
    LinkageSizeMismatch { linkage: usize, distances: usize },

    /// Unknown linkage method name
    #[error("Unknown linkage method: {0}")]
    UnknownMethod(String),
}

/// Result type alias for clustering operations
pub type ClusterResult<T> = Result<T, ClusterError>;
