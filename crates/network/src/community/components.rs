//! Connected components partitioning

use super::{CommunityDetection, Projection};
use citeforge_common::models::ClusteringStrategy;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Every connected component of the projection is one community
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl CommunityDetection for ConnectedComponents {
    fn strategy(&self) -> ClusteringStrategy {
        ClusteringStrategy::ConnectedComponents
    }

    fn partition(&self, projection: &Projection) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::new(projection.nodes);
        for &(a, b) in &projection.edges {
            sets.union(a, b);
        }

        // Group in order of first appearance
        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for node in 0..projection.nodes {
            let root = sets.find(node);
            let slot = *slots.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(node);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let projection = Projection {
            nodes: 5,
            edges: vec![(0, 3), (1, 2)],
        };

        let groups = ConnectedComponents.partition(&projection);
        assert_eq!(groups, vec![vec![0, 3], vec![1, 2], vec![4]]);
    }

    #[test]
    fn test_empty_projection() {
        let groups = ConnectedComponents.partition(&Projection::default());
        assert!(groups.is_empty());
    }
}
