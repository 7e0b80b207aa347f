//! Louvain modularity optimisation
//!
//! Alternates local moving (each node joins the neighbouring community with
//! the best modularity gain) with aggregation (communities become nodes)
//! until a level moves nothing. Nodes and neighbour communities are visited
//! in index order and a move needs a strictly better gain, so the result is
//! fully deterministic.

use super::{CommunityDetection, Projection};
use citeforge_common::models::ClusteringStrategy;
use std::collections::BTreeMap;

/// Gains closer than this count as equal
const GAIN_EPSILON: f64 = 1e-12;

/// Symmetric weighted adjacency. Self-loops hold twice the internal weight,
/// so every row sums to the node degree.
type Adjacency = Vec<BTreeMap<usize, f64>>;

/// Louvain configuration
#[derive(Debug, Clone)]
pub struct Louvain {
    pub resolution: f64,
    /// Local moving passes per level
    pub max_passes: usize,
    pub max_levels: usize,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_passes: 100,
            max_levels: 32,
        }
    }
}

impl CommunityDetection for Louvain {
    fn strategy(&self) -> ClusteringStrategy {
        ClusteringStrategy::Modularity
    }

    fn partition(&self, projection: &Projection) -> Vec<Vec<usize>> {
        let n = projection.nodes;
        let mut adjacency: Adjacency = vec![BTreeMap::new(); n];
        for &(a, b) in &projection.edges {
            *adjacency[a].entry(b).or_insert(0.0) += 1.0;
            *adjacency[b].entry(a).or_insert(0.0) += 1.0;
        }

        // original node -> node of the current level
        let mut membership: Vec<usize> = (0..n).collect();

        if !projection.edges.is_empty() {
            for _ in 0..self.max_levels {
                let (community, moved) = self.local_moving(&adjacency);
                if !moved {
                    break;
                }

                let (renumbered, count) = renumber(&community);
                for level_node in membership.iter_mut() {
                    *level_node = renumbered[*level_node];
                }
                adjacency = aggregate(&adjacency, &renumbered, count);
            }
        }

        // Group in order of first appearance
        let mut slots: BTreeMap<usize, usize> = BTreeMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (node, &community) in membership.iter().enumerate() {
            let slot = *slots.entry(community).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(node);
        }

        groups
    }
}

impl Louvain {
    /// One level of local moving. Returns the community of every node and
    /// whether any node changed community.
    fn local_moving(&self, adjacency: &Adjacency) -> (Vec<usize>, bool) {
        let n = adjacency.len();
        let degrees: Vec<f64> = adjacency.iter().map(|row| row.values().sum()).collect();
        let total: f64 = degrees.iter().sum();

        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = degrees.clone();
        let mut moved_any = false;

        if total <= 0.0 {
            return (community, false);
        }

        for _ in 0..self.max_passes {
            let mut moved = false;

            for node in 0..n {
                let current = community[node];
                let degree = degrees[node];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&neighbour, &weight) in &adjacency[node] {
                    if neighbour != node {
                        *links.entry(community[neighbour]).or_insert(0.0) += weight;
                    }
                }

                totals[current] -= degree;

                let gain = |target: usize, weight: f64| {
                    weight - self.resolution * totals[target] * degree / total
                };

                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&candidate, &weight) in &links {
                    let candidate_gain = gain(candidate, weight);
                    if candidate_gain > best_gain + GAIN_EPSILON {
                        best = candidate;
                        best_gain = candidate_gain;
                    }
                }

                totals[best] += degree;
                if best != current {
                    community[node] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }
            moved_any = true;
        }

        (community, moved_any)
    }
}

/// Dense community labels in order of first appearance
fn renumber(community: &[usize]) -> (Vec<usize>, usize) {
    let mut labels: BTreeMap<usize, usize> = BTreeMap::new();
    let renumbered = community
        .iter()
        .map(|&c| {
            let next = labels.len();
            *labels.entry(c).or_insert(next)
        })
        .collect();
    (renumbered, labels.len())
}

/// Collapse every community into a single node
fn aggregate(adjacency: &Adjacency, community: &[usize], count: usize) -> Adjacency {
    let mut collapsed: Adjacency = vec![BTreeMap::new(); count];
    for (node, row) in adjacency.iter().enumerate() {
        for (&neighbour, &weight) in row {
            *collapsed[community[node]]
                .entry(community[neighbour])
                .or_insert(0.0) += weight;
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangles() -> Projection {
        Projection {
            nodes: 6,
            edges: vec![(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)],
        }
    }

    #[test]
    fn test_two_triangles() {
        let groups = Louvain::default().partition(&triangles());
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_deterministic() {
        let louvain = Louvain::default();
        assert_eq!(louvain.partition(&triangles()), louvain.partition(&triangles()));
    }

    #[test]
    fn test_no_edges_gives_singletons() {
        let projection = Projection {
            nodes: 3,
            edges: Vec::new(),
        };
        let groups = Louvain::default().partition(&projection);
        assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_isolated_node_stays_alone() {
        let projection = Projection {
            nodes: 3,
            edges: vec![(0, 2)],
        };
        let groups = Louvain::default().partition(&projection);
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_aggregation_preserves_degrees() {
        let mut adjacency: Adjacency = vec![BTreeMap::new(); 3];
        for &(a, b) in &[(0, 1), (1, 2)] {
            adjacency[a].insert(b, 1.0);
            adjacency[b].insert(a, 1.0);
        }

        let collapsed = aggregate(&adjacency, &[0, 0, 1], 2);
        assert_eq!(collapsed[0].get(&0), Some(&2.0));
        assert_eq!(collapsed[0].get(&1), Some(&1.0));
        let degree: f64 = collapsed[0].values().sum();
        assert_eq!(degree, 3.0);
    }
}
