//! Conversion between square and condensed distance forms
//!
//! The condensed form lists the strict upper triangle row by row:
//! `(0,1), (0,2), ..., (0,n-1), (1,2), ...`.

use ndarray::{Array2, ArrayView2};

use crate::error::{ClusterError, ClusterResult};

/// Condense a square distance matrix
///
/// The matrix must be square with an exactly zero diagonal and exact symmetry.
pub fn squareform(matrix: ArrayView2<'_, f64>) -> ClusterResult<Vec<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(ClusterError::NotSquare { rows, cols });
    }

    for i in 0..rows {
        let value = matrix[[i, i]];
        if value != 0.0 {
            return Err(ClusterError::NonZeroDiagonal { index: i, value });
        }
    }

    let mut condensed = Vec::with_capacity(rows * rows.saturating_sub(1) / 2);
    for i in 0..rows {
        for j in (i + 1)..rows {
            if matrix[[i, j]] != matrix[[j, i]] {
                return Err(ClusterError::Asymmetric { i, j });
            }
            condensed.push(matrix[[i, j]]);
        }
    }
    Ok(condensed)
}

/// Number of observations described by a condensed array of length `len`
pub fn num_observations(len: usize) -> ClusterResult<usize> {
    let n = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    if n * (n - 1) / 2 != len {
        return Err(ClusterError::InvalidCondensedLength(len));
    }
    Ok(n)
}

/// Expand a condensed array back into a square matrix
pub fn to_square(condensed: &[f64]) -> ClusterResult<Array2<f64>> {
    let n = num_observations(condensed.len())?;
    let mut matrix = Array2::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            matrix[[i, j]] = condensed[k];
            matrix[[j, i]] = condensed[k];
            k += 1;
        }
    }
    Ok(matrix)
}
