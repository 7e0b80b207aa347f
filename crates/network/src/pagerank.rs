//! PageRank-based paper ranking
//!
//! Power iteration over the citation links of a graph. Rank mass of papers
//! citing nothing inside the graph is spread uniformly, so scores always
//! sum to one.

use crate::graph::CitationGraph;
use std::cmp::Ordering;
use std::collections::HashMap;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (typically 0.85)
    pub damping: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Per-node convergence threshold
    pub epsilon: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            epsilon: 1e-6,
        }
    }
}

/// A paper with its PageRank score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPaper {
    pub id: String,
    pub score: f64,
}

/// PageRank scorer for papers
#[derive(Debug, Clone, Default)]
pub struct PageRankScorer {
    config: PageRankConfig,
}

impl PageRankScorer {
    /// Create a new scorer
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// Scores indexed by node handle
    fn scores(&self, graph: &CitationGraph) -> Vec<f64> {
        let n = graph.node_count();
        if n == 0 {
            return Vec::new();
        }

        let n_f64 = n as f64;
        let damping = self.config.damping;
        let teleport = (1.0 - damping) / n_f64;

        let mut out_counts = vec![0usize; n];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (citing, cited) in graph.edge_handles() {
            out_counts[citing.index()] += 1;
            incoming[cited.index()].push(citing.index());
        }

        let mut scores = vec![1.0 / n_f64; n];

        for _ in 0..self.config.max_iterations {
            let dangling: f64 = (0..n)
                .filter(|&i| out_counts[i] == 0)
                .map(|i| scores[i])
                .sum();
            let dangling_share = damping * dangling / n_f64;

            let new_scores: Vec<f64> = (0..n)
                .map(|node| {
                    let citation_sum: f64 = incoming[node]
                        .iter()
                        .map(|&citing| scores[citing] / out_counts[citing] as f64)
                        .sum();
                    teleport + dangling_share + damping * citation_sum
                })
                .collect();

            let diff: f64 = new_scores
                .iter()
                .zip(&scores)
                .map(|(new, old)| (new - old).abs())
                .sum();

            scores = new_scores;

            // Check convergence
            if diff < n_f64 * self.config.epsilon {
                break;
            }
        }

        scores
    }

    /// Compute PageRank scores for all papers
    pub fn compute(&self, graph: &CitationGraph) -> HashMap<String, f64> {
        self.scores(graph)
            .into_iter()
            .zip(graph.nodes())
            .map(|(score, node)| (node.id.clone(), score))
            .collect()
    }

    /// Score and rank papers, highest first, ties by id
    pub fn rank(&self, graph: &CitationGraph, limit: usize) -> Vec<RankedPaper> {
        let mut papers: Vec<RankedPaper> = self
            .scores(graph)
            .into_iter()
            .zip(graph.nodes())
            .map(|(score, node)| RankedPaper {
                id: node.id.clone(),
                score,
            })
            .collect();

        papers.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        papers.truncate(limit);
        papers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagerank_basic() {
        let mut graph = CitationGraph::new();

        // Create a simple graph:
        // A -> B -> C
        //      ^
        //      D
        // B should outrank the papers nobody cites
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("d", "b");

        let scorer = PageRankScorer::new(PageRankConfig::default());
        let scores = scorer.compute(&graph);

        let b_score = scores["b"];
        let a_score = scores["a"];
        assert!(b_score > a_score, "B should rank higher than A");

        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_order_and_ties() {
        let mut graph = CitationGraph::new();
        // x and y are symmetric: both cited once by z
        graph.add_edge("z", "y");
        graph.add_edge("z", "x");

        let ranked = PageRankScorer::default().rank(&graph, 3);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_rank_limit() {
        let mut graph = CitationGraph::new();
        for cited in ["b", "c", "d", "e"] {
            graph.add_edge("a", cited);
        }
        assert_eq!(PageRankScorer::default().rank(&graph, 3).len(), 3);
    }

    #[test]
    fn test_pagerank_empty_graph() {
        let graph = CitationGraph::new();
        let scorer = PageRankScorer::new(PageRankConfig::default());
        let scores = scorer.compute(&graph);

        assert!(scores.is_empty());
    }
}
