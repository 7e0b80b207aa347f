//! CiteForge network core
//!
//! Given a seed publication this crate:
//! - Normalizes the identifier for the metadata provider
//! - Expands a bounded citation neighborhood breadth-first
//! - Computes network statistics (in-degree density, most cited papers)
//! - Partitions the network into communities and ranks key papers by PageRank
//! - Hands the finished graph to an exporter

pub mod analysis;
pub mod builder;
pub mod community;
pub mod export;
pub mod graph;
pub mod normalize;
pub mod pagerank;
pub mod stats;

pub use analysis::{AnalysisReport, AnalysisRequest, CitationAnalyzer, Diagnostics};
pub use builder::{BuildParams, BuildSummary, NetworkBuilder};
pub use community::{detect_clusters, Cluster, ClusterSummary};
pub use export::{JsonGraphExporter, NetworkExporter};
pub use graph::{CitationGraph, NodeStatus, PaperNode};
pub use normalize::normalize;
pub use pagerank::{PageRankConfig, PageRankScorer};
pub use stats::{compute_stats, MostCitedPaper, NetworkStats};

#[cfg(test)]
pub(crate) mod fixtures;
