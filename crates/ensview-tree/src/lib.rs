//! ensview-tree - Distance trees for structural ensemble analysis
//!
//! This crate turns pairwise distance matrices into trees and uses those
//! trees to arrange other data:
//!
//! - **Construction**: neighbor joining and UPGMA from a square matrix
//! - **Reordering**: permute a matrix into the tree's terminal order
//! - **Subgroups**: split the terminal list wherever neighbours are far apart
//! - **Newick**: read and write trees in the standard text format
//!
//! # Example
//!
//! ```
//! use ensview_tree::{calc_tree, find_subgroups};
//! use ndarray::array;
//!
//! let distances = array![[0.0, 0.1, 0.9], [0.1, 0.0, 0.9], [0.9, 0.9, 0.0]];
//! let tree = calc_tree(&["a", "b", "c"], distances.view(), "upgma").unwrap();
//! let groups = find_subgroups(&tree, 0.5).unwrap();
//! assert_eq!(groups.len(), 2);
//! ```

pub mod construct;
pub mod error;
pub mod newick;
pub mod reorder;
pub mod tree;

pub use construct::*;
pub use error::*;
pub use reorder::*;
pub use tree::*;
