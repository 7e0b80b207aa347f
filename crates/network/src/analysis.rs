//! End-to-end citation network analysis
//!
//! Builds the network around a seed, then derives statistics, clusters and
//! an optional visualization artifact from it.

use crate::builder::{BuildParams, NetworkBuilder};
use crate::community::{self, ClusterSummary};
use crate::export::NetworkExporter;
use crate::stats::{compute_stats, NetworkStats};
use citeforge_common::{
    config::AnalysisConfig,
    errors::{AppError, Result},
    metrics,
    models::{ClusteringStrategy, Direction},
    MetadataProvider, DEFAULT_NEIGHBOR_LIMIT,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Input of one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Provider-native id, DOI or arXiv id
    pub seed: String,
    pub depth: u8,
    pub direction: Direction,
    pub max_papers: usize,
}

impl AnalysisRequest {
    /// Request with the default bounds (depth 1, both directions, 50 papers)
    pub fn new(seed: impl Into<String>) -> Self {
        let defaults = BuildParams::default();
        Self {
            seed: seed.into(),
            depth: defaults.depth,
            direction: defaults.direction,
            max_papers: defaults.max_papers,
        }
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_papers(mut self, max_papers: usize) -> Self {
        self.max_papers = max_papers;
        self
    }

    fn params(&self) -> BuildParams {
        BuildParams {
            depth: self.depth,
            direction: self.direction,
            max_papers: self.max_papers,
        }
    }
}

/// How an analysis was carried out
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Strategy that actually produced the clusters
    pub clustering_strategy: ClusteringStrategy,
    /// The configured strategy was unavailable and got substituted
    pub clustering_fallback: bool,
    /// Lookups that errored, timed out or came back empty
    pub fetch_failures: usize,
    /// Part of `fetch_failures` the provider had no record for
    pub unknown_papers: usize,
    pub shadow_nodes: usize,
    pub elapsed_ms: u64,
}

/// Result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub network_stats: NetworkStats,
    pub clusters: Vec<ClusterSummary>,
    pub visualization: Option<String>,
    pub diagnostics: Diagnostics,
}

/// Citation network analyzer
#[derive(Clone)]
pub struct CitationAnalyzer {
    provider: Arc<dyn MetadataProvider>,
    neighbor_limit: usize,
    strategy: ClusteringStrategy,
    exporter: Option<Arc<dyn NetworkExporter>>,
}

impl CitationAnalyzer {
    /// Analyzer with modularity clustering and no exporter
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
            strategy: ClusteringStrategy::default(),
            exporter: None,
        }
    }

    /// Analyzer configured from the `analysis` section
    pub fn from_config(provider: Arc<dyn MetadataProvider>, config: &AnalysisConfig) -> Self {
        Self::new(provider)
            .with_neighbor_limit(config.neighbor_limit)
            .with_strategy(config.clustering)
    }

    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: ClusteringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn NetworkExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    /// Build and analyze the citation network around `request.seed`
    ///
    /// Fails with `EmptyNetwork` when not a single paper could be fetched.
    #[instrument(skip(self, request), fields(seed = %request.seed, depth = request.depth))]
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let start = Instant::now();

        let built = NetworkBuilder::new(self.provider.as_ref())
            .with_neighbor_limit(self.neighbor_limit)
            .build(&request.seed, &request.params())
            .await?;
        let graph = built.graph;

        if graph.attributed_count() == 0 {
            metrics::record_empty_network();
            return Err(AppError::EmptyNetwork {
                reason: format!("no paper could be fetched for '{}'", request.seed.trim()),
            });
        }

        let network_stats = compute_stats(&graph)?;

        let (strategy, fallback) = community::resolve_strategy(self.strategy);
        if fallback {
            warn!(
                preferred = %self.strategy,
                substitute = %strategy,
                "Clustering strategy unavailable in this build, substituting"
            );
            metrics::record_clustering_fallback(self.strategy.as_str());
        }

        let clusters: Vec<ClusterSummary> = community::detect_clusters(&graph, strategy)
            .iter()
            .map(ClusterSummary::from)
            .collect();

        let visualization = self.exporter.as_ref().and_then(|exporter| {
            match exporter.export(&graph) {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!(exporter = exporter.name(), error = %e, "Visualization export failed");
                    None
                }
            }
        });

        let elapsed = start.elapsed();
        metrics::record_analysis(
            elapsed.as_secs_f64(),
            network_stats.nodes,
            network_stats.edges,
            strategy.as_str(),
        );

        info!(
            nodes = network_stats.nodes,
            edges = network_stats.edges,
            clusters = clusters.len(),
            strategy = %strategy,
            elapsed_ms = elapsed.as_millis() as u64,
            "Citation analysis complete"
        );

        Ok(AnalysisReport {
            network_stats,
            clusters,
            visualization,
            diagnostics: Diagnostics {
                clustering_strategy: strategy,
                clustering_fallback: fallback,
                fetch_failures: built.summary.fetch_failures + built.summary.absent,
                unknown_papers: built.summary.absent,
                shadow_nodes: graph.shadow_count(),
                elapsed_ms: elapsed.as_millis() as u64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::JsonGraphExporter;
    use crate::fixtures::{paper, star_cited_by, two_triangles_provider};
    use crate::graph::CitationGraph;
    use citeforge_common::provider::InMemoryProvider;
    use tokio_test::{assert_err, assert_ok};

    struct BrokenExporter;

    impl NetworkExporter for BrokenExporter {
        fn name(&self) -> &str {
            "broken"
        }

        fn export(&self, _graph: &CitationGraph) -> Result<String> {
            Err(AppError::Export {
                message: "renderer unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_cited_by_scenario() {
        let analyzer = CitationAnalyzer::new(Arc::new(star_cited_by()));
        let request = AnalysisRequest::new("A")
            .with_direction(Direction::CitedByOnly)
            .with_max_papers(10);

        let report = assert_ok!(analyzer.analyze(&request).await);
        let stats = &report.network_stats;
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.edges, 2);
        assert_eq!(stats.average_citations, 0.67);
        assert_eq!(stats.most_cited_papers[0].title, "Paper A");
        assert_eq!(stats.most_cited_papers[0].citation_count, 2);

        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].size, 3);
        assert_eq!(report.clusters[0].name, "Cluster 1: Paper A");
        assert!(report.visualization.is_none());
        assert_eq!(report.diagnostics.fetch_failures, 0);
        assert_eq!(report.diagnostics.shadow_nodes, 0);
    }

    #[tokio::test]
    async fn test_cap_of_one_is_not_empty() {
        let analyzer = CitationAnalyzer::new(Arc::new(star_cited_by()));
        let request = AnalysisRequest::new("A").with_max_papers(1);

        let report = assert_ok!(analyzer.analyze(&request).await);
        assert_eq!(report.network_stats.nodes, 1);
        assert_eq!(report.network_stats.edges, 2);
        assert_eq!(report.diagnostics.shadow_nodes, 2);
    }

    #[tokio::test]
    async fn test_seed_failure_is_empty_network() {
        let provider = InMemoryProvider::new().with_failure("DOI:10.1/broken");
        let analyzer = CitationAnalyzer::new(Arc::new(provider));

        let err = assert_err!(analyzer.analyze(&AnalysisRequest::new("10.1/broken")).await);
        assert!(matches!(err, AppError::EmptyNetwork { .. }));
        assert!(err.to_string().contains("10.1/broken"));
    }

    #[tokio::test]
    async fn test_unknown_seed_is_empty_network() {
        let analyzer = CitationAnalyzer::new(Arc::new(InMemoryProvider::new()));

        let err = assert_err!(analyzer.analyze(&AnalysisRequest::new("missing")).await);
        assert!(matches!(err, AppError::EmptyNetwork { .. }));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let analyzer = CitationAnalyzer::new(Arc::new(star_cited_by()));

        let err = assert_err!(analyzer.analyze(&AnalysisRequest::new("A").with_depth(4)).await);
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_two_triangles_end_to_end() {
        let analyzer = CitationAnalyzer::new(Arc::new(two_triangles_provider()));
        let request = AnalysisRequest::new("a3").with_depth(2);

        let report = assert_ok!(analyzer.analyze(&request).await);
        assert_eq!(report.network_stats.nodes, 6);
        assert_eq!(report.network_stats.edges, 6);
        assert_eq!(report.network_stats.average_citations, 1.0);
        assert_eq!(report.network_stats.most_cited_papers[0].title, "Paper a3");
        assert!(report.clusters.iter().all(|c| c.size >= 2 && c.key_papers.len() <= 3));

        #[cfg(feature = "modularity")]
        {
            assert_eq!(report.diagnostics.clustering_strategy, ClusteringStrategy::Modularity);
            assert!(!report.diagnostics.clustering_fallback);
            assert_eq!(report.clusters.len(), 2);
            assert_eq!(report.clusters[0].name, "Cluster 1: Paper a3");
            assert_eq!(report.clusters[1].size, 3);
        }

        #[cfg(not(feature = "modularity"))]
        {
            assert!(report.diagnostics.clustering_fallback);
            assert_eq!(report.clusters.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_connected_components_strategy() {
        let analyzer = CitationAnalyzer::new(Arc::new(two_triangles_provider()))
            .with_strategy(ClusteringStrategy::ConnectedComponents);
        let request = AnalysisRequest::new("a3").with_depth(2);

        let report = assert_ok!(analyzer.analyze(&request).await);
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].size, 6);
        assert_eq!(
            report.diagnostics.clustering_strategy,
            ClusteringStrategy::ConnectedComponents
        );
        assert!(!report.diagnostics.clustering_fallback);
    }

    #[tokio::test]
    async fn test_identical_inputs_identical_reports() {
        let analyzer = CitationAnalyzer::new(Arc::new(two_triangles_provider()))
            .with_exporter(Arc::new(JsonGraphExporter::new()));
        let request = AnalysisRequest::new("a3").with_depth(2);

        let first = assert_ok!(analyzer.analyze(&request).await);
        let second = assert_ok!(analyzer.analyze(&request).await);

        assert_eq!(first.network_stats, second.network_stats);
        assert_eq!(first.clusters, second.clusters);
        assert_eq!(first.visualization, second.visualization);
    }

    #[tokio::test]
    async fn test_export_failure_keeps_report() {
        let analyzer = CitationAnalyzer::new(Arc::new(star_cited_by()))
            .with_exporter(Arc::new(BrokenExporter));

        let report = assert_ok!(analyzer.analyze(&AnalysisRequest::new("A")).await);
        assert!(report.visualization.is_none());
        assert_eq!(report.network_stats.nodes, 3);
    }

    #[tokio::test]
    async fn test_visualization_attached() {
        let analyzer = CitationAnalyzer::new(Arc::new(star_cited_by()))
            .with_exporter(Arc::new(JsonGraphExporter::new()));

        let report = assert_ok!(analyzer.analyze(&AnalysisRequest::new("A")).await);
        let artifact = report.visualization.unwrap_or_default();
        assert!(artifact.contains("\"nodes\""));
    }

    #[tokio::test]
    async fn test_failed_neighbors_reported() {
        let provider = InMemoryProvider::new()
            .with_paper(paper("A", "Paper A", 1).citing(["B", "C"]))
            .with_paper(paper("B", "Paper B", 1))
            .with_failure("C");
        let analyzer = CitationAnalyzer::new(Arc::new(provider));

        let report = assert_ok!(analyzer.analyze(&AnalysisRequest::new("A")).await);
        assert_eq!(report.diagnostics.fetch_failures, 1);
        assert_eq!(report.diagnostics.unknown_papers, 0);
        assert_eq!(report.diagnostics.shadow_nodes, 1);
        assert_eq!(report.network_stats.nodes, 2);
    }

    #[tokio::test]
    async fn test_unknown_neighbors_count_as_failures() {
        let provider = InMemoryProvider::new()
            .with_paper(paper("A", "Paper A", 1).citing(["X", "Y", "B"]))
            .with_failure("B");
        let analyzer = CitationAnalyzer::new(Arc::new(provider));

        let report = assert_ok!(analyzer.analyze(&AnalysisRequest::new("A")).await);
        assert_eq!(report.diagnostics.fetch_failures, 3);
        assert_eq!(report.diagnostics.unknown_papers, 2);
        assert_eq!(report.diagnostics.shadow_nodes, 3);
        assert_eq!(report.network_stats.nodes, 1);
        assert_eq!(report.network_stats.edges, 3);
    }

    #[tokio::test]
    async fn test_fixture_provider_end_to_end() {
        let fixtures = r#"[
            {"record": {"id": "A", "title": "Paper A"}, "citations": ["B", "C"]},
            {"record": {"id": "B", "title": "Paper B"}, "references": ["A"]},
            {"record": {"id": "C", "title": "Paper C"}, "references": ["A", "B"]}
        ]"#;
        let provider = assert_ok!(InMemoryProvider::from_json(fixtures));
        let analyzer = CitationAnalyzer::new(Arc::new(provider));

        let report = assert_ok!(analyzer.analyze(&AnalysisRequest::new("A")).await);
        assert_eq!(report.network_stats.nodes, 3);
        assert_eq!(report.network_stats.most_cited_papers[0].id, "A");
        assert_eq!(report.diagnostics.fetch_failures, 0);
        assert_eq!(report.clusters[0].size, 3);
    }
}
