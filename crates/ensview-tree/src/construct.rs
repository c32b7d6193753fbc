//! Distance-based tree construction
//!
//! Neighbor-joining and UPGMA operate on a shrinking lower-triangular
//! distance matrix. Each merge stores the new cluster at the lower of the two
//! indices and drops the higher one, so cluster positions stay stable for the
//! rest of the loop.

use std::str::FromStr;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::tree::{Clade, NodeId, Tree};

/// Tree construction algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMethod {
    /// Saitou-Nei neighbor joining (unrooted result)
    #[default]
    #[serde(rename = "nj")]
    NeighborJoining,
    /// Average-linkage clustering (rooted, ultrametric result)
    Upgma,
}

impl TreeMethod {
    /// Short name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeMethod::NeighborJoining => "nj",
            TreeMethod::Upgma => "upgma",
        }
    }
}

impl FromStr for TreeMethod {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nj" => Ok(TreeMethod::NeighborJoining),
            "upgma" => Ok(TreeMethod::Upgma),
            _ => Err(TreeError::UnknownMethod(s.to_string())),
        }
    }
}

/// Lower-triangular distance matrix with a label per row
///
/// Row `i` stores distances to rows `0..=i`; lookups are symmetric.
#[derive(Clone, Debug, PartialEq)]
pub struct LowerTriangular {
    pub names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl LowerTriangular {
    /// Keep the lower triangle (diagonal included) of a square matrix
    pub fn from_square(names: Vec<String>, matrix: ArrayView2<'_, f64>) -> Self {
        let rows = matrix
            .outer_iter()
            .enumerate()
            .map(|(i, row)| row.iter().take(i + 1).copied().collect())
            .collect();
        Self { names, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= j {
            self.rows[i][j]
        } else {
            self.rows[j][i]
        }
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        if i >= j {
            self.rows[i][j] = value;
        } else {
            self.rows[j][i] = value;
        }
    }

    /// Drop row and column `index`
    fn remove(&mut self, index: usize) {
        self.rows.remove(index);
        for row in self.rows.iter_mut().skip(index) {
            row.remove(index);
        }
        self.names.remove(index);
    }
}

/// Build a tree from a square distance matrix and matching labels
///
/// `method` is `"nj"` or `"upgma"` (case-insensitive, surrounding whitespace
/// ignored). Internal clades come back unnamed; terminals carry `names`.
pub fn calc_tree<S: AsRef<str>>(
    names: &[S],
    distance_matrix: ArrayView2<'_, f64>,
    method: &str,
) -> TreeResult<Tree> {
    let (rows, cols) = distance_matrix.dim();
    if names.len() != rows || names.len() != cols {
        return Err(TreeError::SizeMismatch {
            names: names.len(),
            rows,
            cols,
        });
    }

    if distance_matrix != distance_matrix.t() {
        warn!("distance matrix is not symmetric, only the lower triangle is used");
    }

    let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    let dm = LowerTriangular::from_square(names, distance_matrix);

    let method: TreeMethod = method.parse()?;
    build_tree(dm, method)
}

/// Build a tree from a lower-triangular matrix with an already parsed method
pub fn build_tree(dm: LowerTriangular, method: TreeMethod) -> TreeResult<Tree> {
    if dm.is_empty() {
        return Err(TreeError::EmptyTree);
    }

    debug!(method = method.as_str(), size = dm.len(), "constructing tree");
    let mut tree = match method {
        TreeMethod::NeighborJoining => neighbor_joining(dm),
        TreeMethod::Upgma => upgma(dm),
    };
    tree.clear_internal_names();
    Ok(tree)
}

fn leaf_clades(tree: &mut Tree, dm: &LowerTriangular) -> Vec<NodeId> {
    dm.names
        .iter()
        .map(|name| tree.add_detached(Clade::named(name.clone())))
        .collect()
}

fn join(tree: &mut Tree, label: String, first: NodeId, second: NodeId) -> NodeId {
    let inner = tree.add_detached(Clade::named(label));
    tree.attach(inner, first);
    tree.attach(inner, second);
    inner
}

fn neighbor_joining(mut dm: LowerTriangular) -> Tree {
    let mut tree = Tree::default();
    let mut clades = leaf_clades(&mut tree, &dm);

    match dm.len() {
        1 => {
            tree.set_root(clades[0]);
            return tree;
        }
        2 => {
            let d = dm.get(1, 0);
            let half = d / 2.0;
            tree.clade_mut(clades[1]).branch_length = Some(half);
            tree.clade_mut(clades[0]).branch_length = Some(d - half);
            let inner = join(&mut tree, "Inner".to_string(), clades[1], clades[0]);
            tree.set_root(inner);
            return tree;
        }
        _ => {}
    }

    let mut last_inner = None;
    let mut inner_count = 0;
    while dm.len() > 2 {
        let n = dm.len();
        let node_dist: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| dm.get(i, j)).sum::<f64>() / (n - 2) as f64)
            .collect();

        let mut min_dist = dm.get(1, 0) - node_dist[1] - node_dist[0];
        let (mut min_i, mut min_j) = (0, 1);
        for i in 1..n {
            for j in 0..i {
                let q = dm.get(i, j) - node_dist[i] - node_dist[j];
                if q < min_dist {
                    min_dist = q;
                    min_i = i;
                    min_j = j;
                }
            }
        }

        let d_ij = dm.get(min_i, min_j);
        let first_length = (d_ij + node_dist[min_i] - node_dist[min_j]) / 2.0;
        tree.clade_mut(clades[min_i]).branch_length = Some(first_length);
        tree.clade_mut(clades[min_j]).branch_length = Some(d_ij - first_length);

        inner_count += 1;
        let label = format!("Inner{inner_count}");
        let inner = join(&mut tree, label.clone(), clades[min_i], clades[min_j]);
        last_inner = Some(inner);

        clades[min_j] = inner;
        clades.remove(min_i);

        for k in 0..n {
            if k != min_i && k != min_j {
                let value = (dm.get(min_i, k) + dm.get(min_j, k) - d_ij) / 2.0;
                dm.set(min_j, k, value);
            }
        }
        dm.names[min_j] = label;
        dm.remove(min_i);
    }

    // Hang the remaining cluster under the most recent internal node.
    let d = dm.get(1, 0);
    let root = if last_inner == Some(clades[0]) {
        tree.clade_mut(clades[0]).branch_length = Some(0.0);
        tree.clade_mut(clades[1]).branch_length = Some(d);
        tree.attach(clades[0], clades[1]);
        clades[0]
    } else {
        tree.clade_mut(clades[0]).branch_length = Some(d);
        tree.clade_mut(clades[1]).branch_length = Some(0.0);
        tree.attach(clades[1], clades[0]);
        clades[1]
    };
    tree.set_root(root);
    tree
}

fn upgma(mut dm: LowerTriangular) -> Tree {
    let mut tree = Tree::default();
    tree.rooted = true;
    let mut clades = leaf_clades(&mut tree, &dm);

    let mut inner_count = 0;
    while dm.len() > 1 {
        let n = dm.len();
        let mut min_dist = dm.get(1, 0);
        let (mut min_i, mut min_j) = (1, 0);
        for i in 1..n {
            for j in 0..i {
                if min_dist >= dm.get(i, j) {
                    min_dist = dm.get(i, j);
                    min_i = i;
                    min_j = j;
                }
            }
        }

        for child in [clades[min_i], clades[min_j]] {
            let length = min_dist / 2.0 - tree.height(child);
            tree.clade_mut(child).branch_length = Some(length);
        }

        inner_count += 1;
        let label = format!("Inner{inner_count}");
        let inner = join(&mut tree, label.clone(), clades[min_i], clades[min_j]);

        clades[min_j] = inner;
        clades.remove(min_i);

        for k in 0..n {
            if k != min_i && k != min_j {
                let value = (dm.get(min_i, k) + dm.get(min_j, k)) / 2.0;
                dm.set(min_j, k, value);
            }
        }
        dm.names[min_j] = label;
        dm.remove(min_i);
    }

    let root = clades[0];
    tree.clade_mut(root).branch_length = Some(0.0);
    tree.set_root(root);
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(" NJ ".parse::<TreeMethod>().unwrap(), TreeMethod::NeighborJoining);
        assert_eq!("Upgma".parse::<TreeMethod>().unwrap(), TreeMethod::Upgma);
        assert!(matches!(
            "ward".parse::<TreeMethod>(),
            Err(TreeError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_lower_triangular_from_square() {
        let m = array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0]];
        let mut dm = LowerTriangular::from_square(names(&["a", "b", "c"]), m.view());
        assert_eq!(dm.get(0, 2), 2.0);
        assert_eq!(dm.get(2, 1), 3.0);
        dm.remove(1);
        assert_eq!(dm.len(), 2);
        assert_eq!(dm.get(1, 0), 2.0);
        assert_eq!(dm.names, names(&["a", "c"]));
    }

    #[test]
    fn test_upgma_ultrametric_pair() {
        let m = array![[0.0, 2.0, 6.0], [2.0, 0.0, 6.0], [6.0, 6.0, 0.0]];
        let tree = calc_tree(&["a", "b", "c"], m.view(), "upgma").unwrap();
        let a = tree.find_terminal("a").unwrap();
        let b = tree.find_terminal("b").unwrap();
        let c = tree.find_terminal("c").unwrap();

        assert!(tree.rooted);
        assert!((tree.distance(a, b).unwrap() - 2.0).abs() < 1e-12);
        assert!((tree.distance(a, c).unwrap() - 6.0).abs() < 1e-12);
        assert!((tree.depth(a) - tree.depth(c)).abs() < 1e-12);
    }

    #[test]
    fn test_nj_recovers_additive_distances() {
        // Additive tree: ((a:1,b:2):1,(c:3,d:1))
        let m = array![
            [0.0, 3.0, 5.0, 3.0],
            [3.0, 0.0, 6.0, 4.0],
            [5.0, 6.0, 0.0, 4.0],
            [3.0, 4.0, 4.0, 0.0]
        ];
        let tree = calc_tree(&["a", "b", "c", "d"], m.view(), "nj").unwrap();
        assert!(!tree.rooted);
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| tree.find_terminal(n).unwrap())
            .collect();
        for i in 0..4 {
            for j in 0..4 {
                let d = tree.distance(ids[i], ids[j]).unwrap();
                assert!((d - m[[i, j]]).abs() < 1e-9, "d({i},{j}) = {d}");
            }
        }
    }

    #[test]
    fn test_nj_two_names() {
        let m = array![[0.0, 4.0], [4.0, 0.0]];
        let tree = calc_tree(&["x", "y"], m.view(), "nj").unwrap();
        assert_eq!(tree.terminal_names(), vec!["y", "x"]);
        let x = tree.find_terminal("x").unwrap();
        assert_eq!(tree.clade(x).branch_length, Some(2.0));
    }

    #[test]
    fn test_single_name() {
        let m = array![[0.0]];
        for method in ["nj", "upgma"] {
            let tree = calc_tree(&["solo"], m.view(), method).unwrap();
            assert_eq!(tree.terminal_names(), vec!["solo"]);
        }
    }

    #[test]
    fn test_empty_matrix_is_rejected() {
        let m = ndarray::Array2::<f64>::zeros((0, 0));
        let empty: [&str; 0] = [];
        assert_eq!(calc_tree(&empty, m.view(), "nj"), Err(TreeError::EmptyTree));
    }
}
