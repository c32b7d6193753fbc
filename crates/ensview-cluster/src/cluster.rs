//! Sorting a matrix by hierarchical clustering

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::condensed::squareform;
use crate::dendrogram::Dendrogram;
use crate::error::{ClusterError, ClusterResult};
use crate::linkage::{linkage, Linkage, LinkageMethod};
use crate::ordering::optimal_leaf_ordering;

/// The matrix to cluster, given as distances or as similarities
#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixInput<'a> {
    pub distance: Option<ArrayView2<'a, f64>>,
    pub similarity: Option<ArrayView2<'a, f64>>,
}

impl<'a> MatrixInput<'a> {
    pub fn distance(matrix: ArrayView2<'a, f64>) -> Self {
        Self {
            distance: Some(matrix),
            similarity: None,
        }
    }

    pub fn similarity(matrix: ArrayView2<'a, f64>) -> Self {
        Self {
            distance: None,
            similarity: Some(matrix),
        }
    }
}

/// Options for [`cluster_matrix`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// One label per matrix row, returned in sorted order
    pub labels: Option<Vec<String>>,
    /// Linkage method
    pub method: LinkageMethod,
    /// Reverse the resulting order
    pub reversed: bool,
    /// Flip merges so adjacent rows are as close as possible
    pub optimal_ordering: bool,
    /// Keep the linkage in the result
    pub return_linkage: bool,
}

/// A matrix sorted into dendrogram leaf order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusteredMatrix {
    /// The supplied matrix permuted on both axes
    #[serde(skip)]
    pub matrix: Array2<f64>,
    /// Original row index of each sorted row
    pub indices: Vec<usize>,
    /// Sorted labels, present when labels were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Merge history, present when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage: Option<Linkage>,
}

/// Cluster a distance or similarity matrix and sort it by leaf order
///
/// Similarities are clustered as `1 - similarity`, but the returned matrix is
/// always the one that was supplied. A distance matrix takes precedence when
/// both are given.
pub fn cluster_matrix(
    input: MatrixInput<'_>,
    options: &ClusterOptions,
) -> ClusterResult<ClusteredMatrix> {
    let (matrix, condensed) = match (input.distance, input.similarity) {
        (Some(distance), _) => (distance, squareform(distance)?),
        (None, Some(similarity)) => {
            let distance = similarity.mapv(|s| 1.0 - s);
            (similarity, squareform(distance.view())?)
        }
        (None, None) => return Err(ClusterError::MissingMatrix),
    };

    let size = matrix.nrows();
    if let Some(labels) = &options.labels {
        if labels.len() != size {
            return Err(ClusterError::LabelCountMismatch {
                labels: labels.len(),
                size,
            });
        }
    }

    let mut linkage = linkage(&condensed, options.method)?;
    if options.optimal_ordering {
        linkage = optimal_leaf_ordering(&linkage, &condensed)?;
    }
    let dendrogram = Dendrogram::from_linkage(&linkage, options.labels.as_deref())?;

    let mut indices = dendrogram.leaves;
    let mut sorted_labels = dendrogram.ivl;
    if options.reversed {
        indices.reverse();
        sorted_labels.reverse();
    }
    debug!(
        size,
        method = options.method.as_str(),
        reversed = options.reversed,
        optimal = options.optimal_ordering,
        "sorted matrix by clustering"
    );

    let sorted = matrix.select(Axis(0), &indices).select(Axis(1), &indices);
    Ok(ClusteredMatrix {
        matrix: sorted,
        indices,
        labels: options.labels.as_ref().map(|_| sorted_labels),
        linkage: options.return_linkage.then_some(linkage),
    })
}
