//! Dendrogram layout of a linkage
//!
//! Leaves are placed at x = 5, 15, 25, ... in left-first traversal order and
//! every merge is drawn as a U-shaped link whose feet sit on its children.

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};
use crate::linkage::Linkage;

/// Horizontal spacing between adjacent leaves
pub const LEAF_SPACING: f64 = 10.0;

/// Leaf order and link coordinates of a dendrogram
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    /// Observation indices in left-to-right order
    pub leaves: Vec<usize>,
    /// Leaf labels in left-to-right order
    pub ivl: Vec<String>,
    /// x coordinates of each U-link, four points per merge
    pub icoord: Vec<[f64; 4]>,
    /// y coordinates of each U-link, four points per merge
    pub dcoord: Vec<[f64; 4]>,
}

impl Dendrogram {
    /// Lay out a linkage, labelling leaves with `labels` or their indices
    pub fn from_linkage(linkage: &Linkage, labels: Option<&[String]>) -> ClusterResult<Self> {
        let n = linkage.observations;
        if let Some(labels) = labels {
            if labels.len() != n {
                return Err(ClusterError::LabelCountMismatch {
                    labels: labels.len(),
                    size: n,
                });
            }
        }
        if linkage.steps.is_empty() {
            return Err(ClusterError::TooFewObservations(n));
        }

        let mut leaves = Vec::with_capacity(n);
        let mut centers = vec![0.0; n + linkage.steps.len()];
        let mut icoord = Vec::with_capacity(linkage.steps.len());
        let mut dcoord = Vec::with_capacity(linkage.steps.len());

        // (cluster, children already visited)
        let mut stack = vec![(linkage.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            match linkage.children(id) {
                None => {
                    centers[id] = LEAF_SPACING * leaves.len() as f64 + LEAF_SPACING / 2.0;
                    leaves.push(id);
                }
                Some((left, right)) if expanded => {
                    let (x_left, x_right) = (centers[left], centers[right]);
                    let height = linkage.height(id);
                    icoord.push([x_left, x_left, x_right, x_right]);
                    dcoord.push([linkage.height(left), height, height, linkage.height(right)]);
                    centers[id] = 0.5 * (x_left + x_right);
                }
                Some((left, right)) => {
                    stack.push((id, true));
                    stack.push((right, false));
                    stack.push((left, false));
                }
            }
        }

        let ivl = leaves
            .iter()
            .map(|&leaf| match labels {
                Some(labels) => labels[leaf].clone(),
                None => leaf.to_string(),
            })
            .collect();

        Ok(Dendrogram {
            leaves,
            ivl,
            icoord,
            dcoord,
        })
    }

    /// Largest merge height, the extent of the distance axis
    pub fn max_height(&self) -> f64 {
        self.dcoord
            .iter()
            .flat_map(|link| link.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Extent of the leaf axis
    pub fn width(&self) -> f64 {
        LEAF_SPACING * self.leaves.len() as f64
    }
}
