//! Community detection
//!
//! Partitions the undirected projection of a citation network and labels
//! each community after its most central paper. Two strategies exist:
//! Louvain modularity optimisation (cargo feature `modularity`) and plain
//! connected components, which is always available.

mod components;
#[cfg(feature = "modularity")]
mod louvain;

pub use components::ConnectedComponents;
#[cfg(feature = "modularity")]
pub use louvain::Louvain;

use crate::graph::CitationGraph;
use crate::pagerank::PageRankScorer;
use citeforge_common::models::ClusteringStrategy;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeSet;

/// Key papers reported per cluster
pub const KEY_PAPER_LIMIT: usize = 3;

/// Longest title carried into a cluster name
const NAME_TITLE_LIMIT: usize = 50;

/// Undirected, simple view of a citation graph. Node `i` is the graph node
/// with handle index `i`.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub nodes: usize,
    /// Distinct `(low, high)` pairs, no self-loops
    pub edges: Vec<(usize, usize)>,
}

impl Projection {
    pub fn from_graph(graph: &CitationGraph) -> Self {
        let edges: BTreeSet<(usize, usize)> = graph
            .edge_handles()
            .map(|(citing, cited)| (citing.index(), cited.index()))
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();

        Self {
            nodes: graph.node_count(),
            edges: edges.into_iter().collect(),
        }
    }
}

/// A partitioning algorithm over a projection
pub trait CommunityDetection: Send + Sync {
    fn strategy(&self) -> ClusteringStrategy;

    /// Disjoint groups covering every node, in a deterministic order
    fn partition(&self, projection: &Projection) -> Vec<Vec<usize>>;
}

/// Whether `strategy` is compiled into this build
pub fn is_available(strategy: ClusteringStrategy) -> bool {
    match strategy {
        ClusteringStrategy::Modularity => cfg!(feature = "modularity"),
        ClusteringStrategy::ConnectedComponents => true,
    }
}

/// Effective strategy for `preferred`, and whether it had to be substituted
pub fn resolve_strategy(preferred: ClusteringStrategy) -> (ClusteringStrategy, bool) {
    if is_available(preferred) {
        (preferred, false)
    } else {
        (ClusteringStrategy::ConnectedComponents, true)
    }
}

fn detector(strategy: ClusteringStrategy) -> Box<dyn CommunityDetection> {
    match resolve_strategy(strategy).0 {
        #[cfg(feature = "modularity")]
        ClusteringStrategy::Modularity => Box::new(Louvain::default()),
        _ => Box::new(ConnectedComponents),
    }
}

/// Highly ranked member of a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPaper {
    pub id: String,
    pub title: String,
    pub score: f64,
}

/// A detected community
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    /// Member ids, shadow nodes included, in graph insertion order
    pub members: Vec<String>,
    pub key_papers: Vec<KeyPaper>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Report form of a cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub name: String,
    pub size: usize,
    /// Titles of the key papers
    pub key_papers: Vec<String>,
}

impl From<&Cluster> for ClusterSummary {
    fn from(cluster: &Cluster) -> Self {
        Self {
            name: cluster.name.clone(),
            size: cluster.size(),
            key_papers: cluster.key_papers.iter().map(|p| p.title.clone()).collect(),
        }
    }
}

/// Detect clusters of size two or more, largest first
pub fn detect_clusters(graph: &CitationGraph, strategy: ClusteringStrategy) -> Vec<Cluster> {
    let projection = Projection::from_graph(graph);
    let detector = detector(strategy);
    let groups = detector.partition(&projection);

    tracing::debug!(
        strategy = %detector.strategy(),
        nodes = projection.nodes,
        edges = projection.edges.len(),
        communities = groups.len(),
        "Partitioned citation network"
    );

    let scorer = PageRankScorer::default();

    let mut clusters: Vec<(String, Cluster)> = groups
        .into_iter()
        .filter(|group| group.len() >= 2)
        .map(|mut group| {
            group.sort_unstable();
            let members: Vec<String> = group
                .iter()
                .map(|&i| graph.node(NodeIndex::new(i)).id.clone())
                .collect();

            let key_papers = key_papers(graph, &members, &scorer);
            let smallest = members.iter().min().cloned().unwrap_or_default();

            (
                smallest,
                Cluster {
                    name: String::new(),
                    members,
                    key_papers,
                },
            )
        })
        .collect();

    clusters.sort_by(|(a_min, a), (b_min, b)| {
        b.size().cmp(&a.size()).then_with(|| a_min.cmp(b_min))
    });

    clusters
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut cluster))| {
            cluster.name = cluster_name(position + 1, &cluster.key_papers);
            cluster
        })
        .collect()
}

/// PageRank over the attributed members only
fn key_papers(graph: &CitationGraph, members: &[String], scorer: &PageRankScorer) -> Vec<KeyPaper> {
    let attributed = members
        .iter()
        .map(String::as_str)
        .filter(|id| graph.get(id).is_some_and(|node| node.is_attributed()));
    let subgraph = graph.subgraph(attributed);

    scorer
        .rank(&subgraph, KEY_PAPER_LIMIT)
        .into_iter()
        .filter_map(|ranked| {
            let title = subgraph.get(&ranked.id)?.title()?.to_string();
            Some(KeyPaper {
                id: ranked.id,
                title,
                score: ranked.score,
            })
        })
        .collect()
}

fn cluster_name(position: usize, key_papers: &[KeyPaper]) -> String {
    match key_papers.first() {
        Some(top) => format!("Cluster {}: {}", position, truncate_title(&top.title)),
        None => format!("Cluster {}: Unknown", position),
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > NAME_TITLE_LIMIT {
        let head: String = title.chars().take(NAME_TITLE_LIMIT).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}
