//! Matrix reordering and subgroup detection against a tree

use ndarray::{Array2, ArrayView2, ArrayViewD, Axis, Ix2};
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::tree::Tree;

/// Default distance cutoff for [`find_subgroups`]
pub const DEFAULT_SUBGROUP_CUTOFF: f64 = 0.8;

/// Reorder a square matrix into the terminal order of `tree`
///
/// `names` labels the matrix rows and must match the tree's terminal names;
/// when omitted the rows are labelled `"0"`, `"1"`, ... . Returns the
/// reordered matrix together with the row indices used, so other per-row data
/// can be permuted the same way.
pub fn reorder_matrix<A: Clone>(
    matrix: ArrayView2<'_, A>,
    tree: &Tree,
    names: Option<&[String]>,
) -> TreeResult<(Array2<A>, Vec<usize>)> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(TreeError::NotSquare { rows, cols });
    }

    let terminals = tree.terminals();
    let default_names: Vec<String>;
    let names = match names {
        Some(names) => {
            if names.len() != rows {
                return Err(TreeError::NamesMatrixMismatch {
                    names: names.len(),
                    size: rows,
                });
            }
            names
        }
        None => {
            default_names = (0..rows).map(|i| i.to_string()).collect();
            default_names.as_slice()
        }
    };
    if names.len() != terminals.len() {
        return Err(TreeError::NamesTerminalMismatch {
            names: names.len(),
            terminals: terminals.len(),
        });
    }

    let indices = terminals
        .iter()
        .map(|id| {
            let label = tree.name(*id);
            names
                .iter()
                .position(|name| *name == label)
                .ok_or(TreeError::LabelNotFound(label))
        })
        .collect::<TreeResult<Vec<usize>>>()?;
    debug!(size = rows, "reordered matrix by tree terminals");

    let reordered = matrix.select(Axis(1), &indices).select(Axis(0), &indices);
    Ok((reordered, indices))
}

/// [`reorder_matrix`] for arrays whose dimensionality is only known at runtime
pub fn reorder_matrix_dyn<A: Clone>(
    matrix: ArrayViewD<'_, A>,
    tree: &Tree,
    names: Option<&[String]>,
) -> TreeResult<(Array2<A>, Vec<usize>)> {
    let ndim = matrix.ndim();
    let matrix = matrix
        .into_dimensionality::<Ix2>()
        .map_err(|_| TreeError::NotTwoDimensional { ndim })?;
    reorder_matrix(matrix, tree, names)
}

/// Split the terminal list into runs of close neighbours
///
/// Walks adjacent terminal pairs in traversal order and starts a new group
/// whenever the tree distance between the two exceeds `cutoff`. The last
/// terminal always closes the final group.
pub fn find_subgroups(tree: &Tree, cutoff: f64) -> TreeResult<Vec<Vec<String>>> {
    let terminals = tree.terminals();
    let last = *terminals.last().ok_or(TreeError::EmptyTree)?;

    let mut subgroups: Vec<Vec<String>> = vec![Vec::new()];
    for pair in terminals.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if let Some(group) = subgroups.last_mut() {
            group.push(tree.name(previous));
        }
        if tree.distance(current, previous)? > cutoff {
            subgroups.push(Vec::new());
        }
    }
    if let Some(group) = subgroups.last_mut() {
        group.push(tree.name(last));
    }

    debug!(groups = subgroups.len(), cutoff, "found subgroups");
    Ok(subgroups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Clade;
    use ndarray::array;

    /// Star tree with terminals in the given order and the given branch lengths
    fn star(labels: &[(&str, f64)]) -> Tree {
        let mut tree = Tree::with_root(Clade::default(), false);
        let root = tree.root().unwrap();
        for (name, length) in labels {
            let mut clade = Clade::named(*name);
            clade.branch_length = Some(*length);
            tree.add_clade(Some(root), clade);
        }
        tree
    }

    #[test]
    fn test_reorder_by_terminal_order() {
        let tree = star(&[("c", 1.0), ("a", 1.0), ("b", 1.0)]);
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let m = array![[0, 1, 2], [10, 11, 12], [20, 21, 22]];

        let (reordered, indices) = reorder_matrix(m.view(), &tree, Some(names.as_slice())).unwrap();
        assert_eq!(indices, vec![2, 0, 1]);
        assert_eq!(reordered, array![[22, 20, 21], [2, 0, 1], [12, 10, 11]]);
    }

    #[test]
    fn test_reorder_default_names() {
        let tree = star(&[("1", 1.0), ("0", 1.0)]);
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let (reordered, indices) = reorder_matrix(m.view(), &tree, None).unwrap();
        assert_eq!(indices, vec![1, 0]);
        assert_eq!(reordered, array![[4.0, 3.0], [2.0, 1.0]]);
    }

    #[test]
    fn test_reorder_rejects_bad_shapes() {
        let tree = star(&[("0", 1.0), ("1", 1.0)]);
        let rect = ndarray::Array2::<f64>::zeros((2, 3));
        assert_eq!(
            reorder_matrix(rect.view(), &tree, None),
            Err(TreeError::NotSquare { rows: 2, cols: 3 })
        );

        let big = ndarray::Array2::<f64>::zeros((3, 3));
        assert_eq!(
            reorder_matrix(big.view(), &tree, None),
            Err(TreeError::NamesTerminalMismatch {
                names: 3,
                terminals: 2
            })
        );

        let names = vec!["0".to_string()];
        let small = ndarray::Array2::<f64>::zeros((2, 2));
        assert!(matches!(
            reorder_matrix(small.view(), &tree, Some(names.as_slice())),
            Err(TreeError::NamesMatrixMismatch { .. })
        ));

        let names: Vec<String> = ["0", "1", "2"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            reorder_matrix(big.view(), &tree, Some(names.as_slice())),
            Err(TreeError::NamesTerminalMismatch { .. })
        ));
    }

    #[test]
    fn test_reorder_missing_label() {
        let tree = star(&[("x", 1.0), ("y", 1.0)]);
        let names = vec!["x".to_string(), "z".to_string()];
        let m = ndarray::Array2::<f64>::zeros((2, 2));
        assert_eq!(
            reorder_matrix(m.view(), &tree, Some(names.as_slice())),
            Err(TreeError::LabelNotFound("y".to_string()))
        );
    }

    #[test]
    fn test_reorder_dyn_rejects_3d() {
        let tree = star(&[("0", 1.0)]);
        let cube = ndarray::ArrayD::<f64>::zeros(ndarray::IxDyn(&[1, 1, 1]));
        assert_eq!(
            reorder_matrix_dyn(cube.view(), &tree, None),
            Err(TreeError::NotTwoDimensional { ndim: 3 })
        );
    }

    #[test]
    fn test_subgroups_single_run() {
        let tree = star(&[("A", 0.1), ("B", 0.1), ("C", 0.1), ("D", 0.1)]);
        let groups = find_subgroups(&tree, DEFAULT_SUBGROUP_CUTOFF).unwrap();
        assert_eq!(groups, vec![vec!["A", "B", "C", "D"]]);
    }

    #[test]
    fn test_subgroups_split_between_b_and_c() {
        // ((A,B),(C,D)): B-C spans 0.1 + 0.5 + 0.5 + 0.1, cherries span 0.2
        let mut tree = Tree::with_root(Clade::default(), false);
        let root = tree.root().unwrap();
        for pair in [["A", "B"], ["C", "D"]] {
            let inner = tree.add_clade(
                Some(root),
                Clade {
                    branch_length: Some(0.5),
                    ..Default::default()
                },
            );
            for name in pair {
                let mut leaf = Clade::named(name);
                leaf.branch_length = Some(0.1);
                tree.add_clade(Some(inner), leaf);
            }
        }
        let groups = find_subgroups(&tree, 0.8).unwrap();
        assert_eq!(groups, vec![vec!["A", "B"], vec!["C", "D"]]);
    }

    #[test]
    fn test_subgroups_single_terminal() {
        let tree = star(&[("only", 1.0)]);
        assert_eq!(find_subgroups(&tree, 0.8).unwrap(), vec![vec!["only"]]);
    }

    #[test]
    fn test_unnamed_terminals_are_labelled_none() {
        let mut tree = star(&[("A", 0.1)]);
        let root = tree.root().unwrap();
        tree.add_clade(
            Some(root),
            Clade {
                branch_length: Some(0.1),
                ..Default::default()
            },
        );
        assert_eq!(
            find_subgroups(&tree, 0.8).unwrap(),
            vec![vec!["A", "None"]]
        );

        let names = vec!["None".to_string(), "A".to_string()];
        let m = array![[0, 1], [10, 11]];
        let (reordered, indices) = reorder_matrix(m.view(), &tree, Some(names.as_slice())).unwrap();
        assert_eq!(indices, vec![1, 0]);
        assert_eq!(reordered, array![[11, 10], [1, 0]]);
    }

    #[test]
    fn test_subgroups_empty_tree() {
        assert_eq!(
            find_subgroups(&Tree::default(), 0.8),
            Err(TreeError::EmptyTree)
        );
    }
}
