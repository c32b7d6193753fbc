//! ensview-io - Data files for ensemble analysis
//!
//! - **Matrices**: CSV with optional row and column labels
//! - **Columns**: headed CSV columns for line plots
//! - **Trees**: Newick text files

pub mod columns;
pub mod error;
pub mod matrix;
pub mod newick;

pub use columns::*;
pub use error::*;
pub use matrix::{format_matrix, parse_matrix, read_matrix_csv, write_matrix_csv, LabeledMatrix};
pub use newick::*;
