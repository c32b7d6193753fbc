//! Agglomerative hierarchical clustering
//!
//! Clusters are merged greedily by smallest inter-cluster distance and the
//! distances to the merged cluster are updated with the Lance-Williams
//! recurrence of the chosen method. The result uses the conventional linkage
//! layout: row `k` merges clusters `left < right` at `distance`, producing
//! cluster `n + k` that holds `size` observations.
//!
//! Rows are sorted by distance before cluster ids are assigned. Centroid and
//! median linkage can merge below an earlier height, and their rows still come
//! out in nondecreasing distance order.

use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::condensed::num_observations;
use crate::error::{ClusterError, ClusterResult};

/// Inter-cluster distance update rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    /// Nearest pair of members
    #[default]
    Single,
    /// Farthest pair of members
    Complete,
    /// Size-weighted mean distance (UPGMA)
    Average,
    /// Unweighted mean of the two merged distances (WPGMA)
    Weighted,
    /// Distance between centroids (UPGMC)
    Centroid,
    /// Distance between midpoints of merged clusters (WPGMC)
    Median,
    /// Minimum increase of within-cluster variance
    Ward,
}

impl LinkageMethod {
    /// All methods, in documentation order
    pub const ALL: [LinkageMethod; 7] = [
        LinkageMethod::Single,
        LinkageMethod::Complete,
        LinkageMethod::Average,
        LinkageMethod::Weighted,
        LinkageMethod::Centroid,
        LinkageMethod::Median,
        LinkageMethod::Ward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageMethod::Single => "single",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Average => "average",
            LinkageMethod::Weighted => "weighted",
            LinkageMethod::Centroid => "centroid",
            LinkageMethod::Median => "median",
            LinkageMethod::Ward => "ward",
        }
    }

    /// Distance from cluster `k` to the union of clusters `i` and `j`
    fn update(
        &self,
        d_ik: f64,
        d_jk: f64,
        d_ij: f64,
        size_i: f64,
        size_j: f64,
        size_k: f64,
    ) -> f64 {
        match self {
            LinkageMethod::Single => d_ik.min(d_jk),
            LinkageMethod::Complete => d_ik.max(d_jk),
            LinkageMethod::Average => (size_i * d_ik + size_j * d_jk) / (size_i + size_j),
            LinkageMethod::Weighted => 0.5 * (d_ik + d_jk),
            LinkageMethod::Centroid => {
                let size_ij = size_i + size_j;
                ((size_i * d_ik * d_ik + size_j * d_jk * d_jk
                    - size_i * size_j * d_ij * d_ij / size_ij)
                    / size_ij)
                    .max(0.0)
                    .sqrt()
            }
            LinkageMethod::Median => (0.5 * (d_ik * d_ik + d_jk * d_jk) - 0.25 * d_ij * d_ij)
                .max(0.0)
                .sqrt(),
            LinkageMethod::Ward => {
                let total = size_i + size_j + size_k;
                (((size_i + size_k) * d_ik * d_ik + (size_j + size_k) * d_jk * d_jk
                    - size_k * d_ij * d_ij)
                    / total)
                    .max(0.0)
                    .sqrt()
            }
        }
    }
}

impl FromStr for LinkageMethod {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        LinkageMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| ClusterError::UnknownMethod(s.to_string()))
    }
}

/// One merge of the clustering history
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkageStep {
    /// Smaller id of the two merged clusters, or the cluster drawn first
    /// after [`optimal_leaf_ordering`](crate::optimal_leaf_ordering)
    pub left: usize,
    /// The other merged cluster
    pub right: usize,
    /// Distance at which the clusters were merged
    pub distance: f64,
    /// Number of observations in the merged cluster
    pub size: usize,
}

/// Complete merge history of a clustering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Linkage {
    /// Number of original observations
    pub observations: usize,
    /// `observations - 1` merges in order
    pub steps: Vec<LinkageStep>,
}

impl Linkage {
    /// Id of the final cluster containing every observation
    pub fn root(&self) -> usize {
        self.observations + self.steps.len() - 1
    }

    /// Children of a cluster id, None for original observations
    pub fn children(&self, id: usize) -> Option<(usize, usize)> {
        id.checked_sub(self.observations)
            .and_then(|k| self.steps.get(k))
            .map(|step| (step.left, step.right))
    }

    /// Merge height of a cluster id (zero for observations)
    pub fn height(&self, id: usize) -> f64 {
        id.checked_sub(self.observations)
            .and_then(|k| self.steps.get(k))
            .map_or(0.0, |step| step.distance)
    }

    /// Conventional `(n-1) x 4` array `[left, right, distance, size]`
    pub fn to_array(&self) -> Array2<f64> {
        let mut array = Array2::zeros((self.steps.len(), 4));
        for (k, step) in self.steps.iter().enumerate() {
            array[[k, 0]] = step.left as f64;
            array[[k, 1]] = step.right as f64;
            array[[k, 2]] = step.distance;
            array[[k, 3]] = step.size as f64;
        }
        array
    }
}

/// Cluster observations given their condensed pairwise distances
pub fn linkage(condensed: &[f64], method: LinkageMethod) -> ClusterResult<Linkage> {
    let n = num_observations(condensed.len())?;
    if n < 2 {
        return Err(ClusterError::TooFewObservations(n));
    }
    if condensed.iter().any(|d| !d.is_finite()) {
        return Err(ClusterError::NonFinite);
    }

    let mut dist = Array2::<f64>::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            dist[[i, j]] = condensed[k];
            dist[[j, i]] = condensed[k];
            k += 1;
        }
    }

    // Merged clusters reuse the lower slot, so a slot always names a member.
    let mut active = vec![true; n];
    let mut sizes = vec![1usize; n];
    let mut merges = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                let d = dist[[i, j]];
                if best.map_or(true, |(min, _, _)| d < min) {
                    best = Some((d, i, j));
                }
            }
        }
        let Some((d_ij, i, j)) = best else {
            break;
        };

        merges.push((i, j, d_ij));

        for other in (0..n).filter(|&o| active[o] && o != i && o != j) {
            let updated = method.update(
                dist[[i, other]],
                dist[[j, other]],
                d_ij,
                sizes[i] as f64,
                sizes[j] as f64,
                sizes[other] as f64,
            );
            dist[[i, other]] = updated;
            dist[[other, i]] = updated;
        }

        active[j] = false;
        sizes[i] += sizes[j];
    }

    // Stable, so equal heights keep merge order.
    merges.sort_by(|a, b| a.2.total_cmp(&b.2));
    let steps = label_merges(n, &merges);

    debug!(observations = n, method = method.as_str(), "computed linkage");
    Ok(Linkage {
        observations: n,
        steps,
    })
}

/// Assign cluster ids to merges given as pairs of member observations
fn label_merges(n: usize, merges: &[(usize, usize, f64)]) -> Vec<LinkageStep> {
    let mut sets = ClusterSets::new(n);
    merges
        .iter()
        .map(|&(a, b, distance)| {
            let (x, y) = (sets.find(a), sets.find(b));
            let size = sets.merge(x, y);
            LinkageStep {
                left: x.min(y),
                right: x.max(y),
                distance,
                size,
            }
        })
        .collect()
}

/// Union-find over cluster ids; every union creates the next id
struct ClusterSets {
    parent: Vec<usize>,
    size: Vec<usize>,
    next: usize,
}

impl ClusterSets {
    fn new(n: usize) -> Self {
        let total = 2 * n - 1;
        let mut size = vec![0; total];
        size[..n].fill(1);
        Self {
            parent: (0..total).collect(),
            size,
            next: n,
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    /// Join two roots under a fresh id and return its size
    fn merge(&mut self, x: usize, y: usize) -> usize {
        let id = self.next;
        self.next += 1;
        self.parent[x] = id;
        self.parent[y] = id;
        self.size[id] = self.size[x] + self.size[y];
        self.size[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condensed::squareform;
    use rstest::rstest;

    /// Points 0, 1, 5, 6 on a line
    fn line_distances() -> Vec<f64> {
        let points = [0.0f64, 1.0, 5.0, 6.0];
        let m = Array2::from_shape_fn((4, 4), |(i, j)| (points[i] - points[j]).abs());
        squareform(m.view()).unwrap()
    }

    #[rstest]
    #[case(LinkageMethod::Single, 4.0)]
    #[case(LinkageMethod::Complete, 6.0)]
    #[case(LinkageMethod::Average, 5.0)]
    #[case(LinkageMethod::Weighted, 5.0)]
    #[case(LinkageMethod::Centroid, 5.0)]
    #[case(LinkageMethod::Median, 5.0)]
    #[case(LinkageMethod::Ward, 50.0f64.sqrt())]
    fn test_final_merge_height(#[case] method: LinkageMethod, #[case] expected: f64) {
        let linkage = linkage(&line_distances(), method).unwrap();
        assert_eq!(linkage.steps.len(), 3);
        assert_eq!(
            (linkage.steps[0].left, linkage.steps[0].right, linkage.steps[0].size),
            (0, 1, 2)
        );
        assert_eq!(
            (linkage.steps[1].left, linkage.steps[1].right, linkage.steps[1].size),
            (2, 3, 2)
        );
        let last = linkage.steps[2];
        assert_eq!((last.left, last.right, last.size), (4, 5, 4));
        assert!((last.distance - expected).abs() < 1e-9, "{method:?}: {}", last.distance);
    }

    #[rstest]
    #[case(LinkageMethod::Centroid)]
    #[case(LinkageMethod::Median)]
    fn test_inverted_merges_sorted_by_height(#[case] method: LinkageMethod) {
        // equilateral triangle: the second merge sits below the first
        let linkage = linkage(&[1.0, 1.0, 1.0], method).unwrap();
        let first = linkage.steps[0];
        assert_eq!((first.left, first.right, first.size), (0, 2, 2));
        assert!((first.distance - 0.75f64.sqrt()).abs() < 1e-12);
        let second = linkage.steps[1];
        assert_eq!((second.left, second.right, second.size), (1, 3, 3));
        assert_eq!(second.distance, 1.0);
        assert_eq!(linkage.children(linkage.root()), Some((1, 3)));
    }

    #[test]
    fn test_method_parsing() {
        for method in LinkageMethod::ALL {
            assert_eq!(method.as_str().parse::<LinkageMethod>().unwrap(), method);
        }
        assert_eq!(" Ward ".parse::<LinkageMethod>().unwrap(), LinkageMethod::Ward);
        assert!(matches!(
            "nj".parse::<LinkageMethod>(),
            Err(ClusterError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert_eq!(
            linkage(&[], LinkageMethod::Single),
            Err(ClusterError::TooFewObservations(1))
        );
        assert_eq!(
            linkage(&[1.0, 2.0], LinkageMethod::Single),
            Err(ClusterError::InvalidCondensedLength(2))
        );
        assert_eq!(
            linkage(&[1.0, f64::NAN, 2.0], LinkageMethod::Single),
            Err(ClusterError::NonFinite)
        );
    }

    #[test]
    fn test_to_array_layout() {
        let linkage = linkage(&line_distances(), LinkageMethod::Single).unwrap();
        let array = linkage.to_array();
        assert_eq!(array.dim(), (3, 4));
        assert_eq!(array.row(2).to_vec(), vec![4.0, 5.0, 4.0, 4.0]);
        assert_eq!(linkage.root(), 6);
        assert_eq!(linkage.children(6), Some((4, 5)));
        assert_eq!(linkage.children(3), None);
    }
}
