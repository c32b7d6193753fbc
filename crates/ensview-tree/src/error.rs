//! Error types for ensview-tree

use thiserror::Error;

/// Errors raised while building, parsing or applying a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Label count does not match the distance matrix
    #[error("Mismatch between the sizes of matrix and names: {names} names for a {rows}x{cols} matrix")]
    SizeMismatch {
        names: usize,
        rows: usize,
        cols: usize,
    },

    /// Unrecognized construction method
    #[error("Method can be only either \"nj\" or \"upgma\", got '{0}'")]
    UnknownMethod(String),

    /// Matrix has the wrong number of dimensions
    #[error("matrix should be a 2D matrix, got {ndim} dimensions")]
    NotTwoDimensional { ndim: usize },

    /// Matrix is not square
    #[error("matrix should be a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Names do not cover every matrix row/column
    #[error("names should have entries for each matrix row/column ({names} names, {size} rows)")]
    NamesMatrixMismatch { names: usize, size: usize },

    /// Names do not cover every tree terminal
    #[error("names should have entries for each tree terminal ({names} names, {terminals} terminals)")]
    NamesTerminalMismatch { names: usize, terminals: usize },

    /// A tree terminal has no matching label
    #[error("tree terminal '{0}' not found in names")]
    LabelNotFound(String),

    /// Operation needs at least one terminal
    #[error("tree must have at least one terminal")]
    EmptyTree,

    /// Two clades do not belong to the same tree
    #[error("clades {0} and {1} have no common ancestor")]
    Disconnected(usize, usize),

    /// Newick text could not be parsed
    #[error("Newick parse error at byte {position}: {message}")]
    Newick { position: usize, message: String },
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = TreeError::SizeMismatch {
            names: 3,
            rows: 4,
            cols: 4,
        };
        assert!(err.to_string().contains("3 names for a 4x4"));
    }

    #[test]
    fn test_unknown_method_display() {
        let err = TreeError::UnknownMethod("bionj".to_string());
        assert!(err.to_string().contains("bionj"));
    }
}
