//! ensview-cluster - Hierarchical clustering of pairwise matrices
//!
//! Provides the pieces needed to sort a distance or similarity matrix so that
//! related rows sit next to each other:
//!
//! - **Condensed form**: validated conversion of square matrices
//! - **Linkage**: agglomerative clustering with seven update rules
//! - **Dendrogram**: leaf order and link geometry of a linkage
//! - **Ordering**: optional optimal leaf ordering of a linkage
//! - **Sorting**: [`cluster_matrix`] ties them together
//!
//! # Example
//!
//! ```
//! use ensview_cluster::{cluster_matrix, ClusterOptions, MatrixInput};
//! use ndarray::array;
//!
//! let distances = array![[0.0, 0.9, 0.1], [0.9, 0.0, 0.8], [0.1, 0.8, 0.0]];
//! let sorted = cluster_matrix(MatrixInput::distance(distances.view()), &ClusterOptions::default())
//!     .unwrap();
//! assert_eq!(sorted.indices, vec![1, 0, 2]);
//! ```

pub mod cluster;
pub mod condensed;
pub mod dendrogram;
pub mod error;
pub mod linkage;
pub mod ordering;

pub use cluster::*;
pub use condensed::*;
pub use dendrogram::*;
pub use error::*;
pub use linkage::*;
pub use ordering::*;
