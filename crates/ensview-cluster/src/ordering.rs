//! Optimal leaf ordering of a linkage
//!
//! Every merge may draw its two children in either order. This picks the
//! orientation of every merge so that the sum of distances between adjacent
//! leaves is minimal (Bar-Joseph, Gifford and Jaakkola, 2001).

use std::collections::BTreeMap;

use tracing::debug;

use crate::condensed::num_observations;
use crate::error::{ClusterError, ClusterResult};
use crate::linkage::{Linkage, LinkageStep};

/// Cost of the best ordering of a cluster for each pair of end leaves
type EndCosts = BTreeMap<(usize, usize), f64>;

/// Pairwise lookup into a condensed distance array
struct Condensed<'a> {
    values: &'a [f64],
    n: usize,
}

impl Condensed<'_> {
    fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (i, j) = (i.min(j), i.max(j));
        self.values[self.n * i - i * (i + 1) / 2 + j - i - 1]
    }
}

/// Sum of distances between neighbouring observations of `order`
pub fn path_length(order: &[usize], condensed: &[f64]) -> ClusterResult<f64> {
    let n = num_observations(condensed.len())?;
    let dist = Condensed {
        values: condensed,
        n,
    };
    if let Some(&bad) = order.iter().find(|&&i| i >= n) {
        return Err(ClusterError::ObservationOutOfRange {
            index: bad,
            observations: n,
        });
    }
    Ok(order.windows(2).map(|w| dist.get(w[0], w[1])).sum())
}

/// Reorient the merges of `linkage` to minimise [`path_length`] of its leaves
///
/// Heights and sizes are unchanged. A step's `left` becomes the child drawn
/// first, so it may carry the larger id afterwards.
pub fn optimal_leaf_ordering(linkage: &Linkage, condensed: &[f64]) -> ClusterResult<Linkage> {
    let n = num_observations(condensed.len())?;
    if n != linkage.observations {
        return Err(ClusterError::LinkageSizeMismatch {
            linkage: linkage.observations,
            distances: n,
        });
    }
    if linkage.steps.is_empty() {
        return Err(ClusterError::TooFewObservations(n));
    }
    let dist = Condensed {
        values: condensed,
        n,
    };

    let total = n + linkage.steps.len();
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut costs: Vec<EndCosts> = (0..n).map(|i| EndCosts::from([((i, i), 0.0)])).collect();
    members.reserve(total - n);
    costs.reserve(total - n);

    for step in &linkage.steps {
        let (a, b) = (step.left, step.right);
        let mut merged = EndCosts::new();
        for &u in &members[a] {
            // cheapest way to leave `a` from end u and enter `b` at k
            let entry: Vec<(usize, f64)> = members[b]
                .iter()
                .map(|&k| {
                    let best = members[a]
                        .iter()
                        .filter_map(|&m| costs[a].get(&(u, m)).map(|c| c + dist.get(m, k)))
                        .fold(f64::INFINITY, f64::min);
                    (k, best)
                })
                .collect();
            for &w in &members[b] {
                let best = entry
                    .iter()
                    .filter_map(|&(k, c)| costs[b].get(&(k, w)).map(|c2| c + c2))
                    .fold(f64::INFINITY, f64::min);
                merged.insert((u, w), best);
                merged.insert((w, u), best);
            }
        }
        let mut joined = members[a].clone();
        joined.extend_from_slice(&members[b]);
        members.push(joined);
        costs.push(merged);
    }

    let root = linkage.root();
    let mut best: Option<((usize, usize), f64)> = None;
    for (&ends, &cost) in &costs[root] {
        if best.map_or(true, |(_, min)| cost < min) {
            best = Some((ends, cost));
        }
    }
    let Some(((u, w), cost)) = best else {
        return Err(ClusterError::TooFewObservations(n));
    };

    let order = backtrack(linkage, &members, &costs, &dist, root, u, w);
    let mut position = vec![0usize; n];
    for (p, &leaf) in order.iter().enumerate() {
        position[leaf] = p;
    }
    let first = |id: usize| members[id].iter().map(|&m| position[m]).min().unwrap_or(0);

    let steps = linkage
        .steps
        .iter()
        .map(|step| {
            let (left, right) = if first(step.left) <= first(step.right) {
                (step.left, step.right)
            } else {
                (step.right, step.left)
            };
            LinkageStep {
                left,
                right,
                ..*step
            }
        })
        .collect();

    debug!(observations = n, path_length = cost, "optimal leaf ordering");
    Ok(Linkage {
        observations: n,
        steps,
    })
}

/// Leaf order of cluster `id` that starts at `u`, ends at `w` and realises its cost
fn backtrack(
    linkage: &Linkage,
    members: &[Vec<usize>],
    costs: &[EndCosts],
    dist: &Condensed<'_>,
    id: usize,
    u: usize,
    w: usize,
) -> Vec<usize> {
    let Some((left, right)) = linkage.children(id) else {
        return vec![id];
    };
    let (x, y) = if members[left].contains(&u) {
        (left, right)
    } else {
        (right, left)
    };

    let mut best: Option<(usize, usize, f64)> = None;
    for &m in &members[x] {
        let Some(&head) = costs[x].get(&(u, m)) else {
            continue;
        };
        for &k in &members[y] {
            let Some(&tail) = costs[y].get(&(k, w)) else {
                continue;
            };
            let cost = head + dist.get(m, k) + tail;
            if best.map_or(true, |(_, _, min)| cost < min) {
                best = Some((m, k, cost));
            }
        }
    }

    match best {
        Some((m, k, _)) => {
            let mut order = backtrack(linkage, members, costs, dist, x, u, m);
            order.extend(backtrack(linkage, members, costs, dist, y, k, w));
            order
        }
        None => members[id].clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condensed::squareform;
    use crate::dendrogram::Dendrogram;
    use crate::linkage::{linkage, LinkageMethod};
    use ndarray::Array2;

    fn points_condensed(points: &[f64]) -> Vec<f64> {
        let n = points.len();
        let m = Array2::from_shape_fn((n, n), |(i, j)| (points[i] - points[j]).abs());
        squareform(m.view()).unwrap()
    }

    #[test]
    fn test_flips_pairs_to_meet_in_the_middle() {
        let condensed = points_condensed(&[0.0, 2.0, 10.0, 11.0]);
        let z = linkage(&condensed, LinkageMethod::Single).unwrap();
        let plain = Dendrogram::from_linkage(&z, None).unwrap();
        assert_eq!(plain.leaves, vec![2, 3, 0, 1]);
        assert_eq!(path_length(&plain.leaves, &condensed).unwrap(), 14.0);

        let ordered = optimal_leaf_ordering(&z, &condensed).unwrap();
        let leaves = Dendrogram::from_linkage(&ordered, None).unwrap().leaves;
        assert_eq!(leaves, vec![0, 1, 2, 3]);
        assert_eq!(path_length(&leaves, &condensed).unwrap(), 11.0);
        assert_eq!(ordered.children(ordered.root()), Some((5, 4)));
        assert_eq!(ordered.to_array().column(2), z.to_array().column(2));
    }

    #[test]
    fn test_rejects_mismatched_distances() {
        let z = linkage(&points_condensed(&[0.0, 1.0, 3.0]), LinkageMethod::Single).unwrap();
        assert_eq!(
            optimal_leaf_ordering(&z, &[1.0]),
            Err(ClusterError::LinkageSizeMismatch {
                linkage: 3,
                distances: 2
            })
        );
        assert_eq!(
            optimal_leaf_ordering(&z, &[1.0, 2.0]),
            Err(ClusterError::InvalidCondensedLength(2))
        );
        assert_eq!(
            path_length(&[0, 3], &[1.0, 2.0, 3.0]),
            Err(ClusterError::ObservationOutOfRange {
                index: 3,
                observations: 3
            })
        );
    }
}
