//! Bounded breadth-first citation expansion
//!
//! Starting from a seed, each level fetches the frontier papers in order,
//! records citation edges eagerly (towards fetched or not-yet-fetched
//! papers alike) and queues unvisited neighbors for the next level. Work is
//! bounded by `depth`, `max_papers` and the per-paper neighbor limit.

use crate::graph::CitationGraph;
use crate::normalize::normalize;
use citeforge_common::{
    errors::{AppError, Result},
    metrics::{self, FetchOutcome},
    models::Direction,
    FetchedPaper, MetadataProvider, DEFAULT_NEIGHBOR_LIMIT, MAX_NETWORK_PAPERS,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Expansion bounds for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    /// Levels expanded beyond the seed (1..=3)
    pub depth: u8,
    pub direction: Direction,
    /// Cap on attributed papers (1..=100)
    pub max_papers: usize,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            depth: 1,
            direction: Direction::Both,
            max_papers: 50,
        }
    }
}

impl BuildParams {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.depth) {
            return Err(AppError::Validation {
                message: format!("depth must be between 1 and 3, got {}", self.depth),
                field: Some("depth".to_string()),
            });
        }
        if !(1..=MAX_NETWORK_PAPERS).contains(&self.max_papers) {
            return Err(AppError::Validation {
                message: format!(
                    "max_papers must be between 1 and {}, got {}",
                    MAX_NETWORK_PAPERS, self.max_papers
                ),
                field: Some("max_papers".to_string()),
            });
        }
        Ok(())
    }
}

/// Counters collected while building
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    /// Papers fetched and attributed
    pub fetched: usize,
    /// Lookups that errored
    pub fetch_failures: usize,
    /// Lookups the provider had no record for
    pub absent: usize,
    /// Levels that processed at least one frontier
    pub levels: usize,
}

/// A finished network plus build counters
#[derive(Debug, Clone)]
pub struct BuiltNetwork {
    pub graph: CitationGraph,
    pub summary: BuildSummary,
}

/// Ordered set of ids discovered for the next level
#[derive(Default)]
struct NextFrontier {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl NextFrontier {
    fn push(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.order.push(id.to_string());
        }
    }
}

/// Citation network builder over a metadata provider
pub struct NetworkBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    neighbor_limit: usize,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
        }
    }

    /// Override how many citations/references are consumed per paper
    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit.max(1);
        self
    }

    /// Expand the citation neighborhood of `seed`
    ///
    /// Failed or empty lookups are skipped. The returned graph may hold no
    /// attributed node at all; callers decide whether that is an error.
    pub async fn build(&self, seed: &str, params: &BuildParams) -> Result<BuiltNetwork> {
        params.validate()?;
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(AppError::Validation {
                message: "seed must not be empty".to_string(),
                field: Some("seed".to_string()),
            });
        }

        let mut graph = CitationGraph::new();
        let mut summary = BuildSummary::default();
        let mut visited: HashSet<String> = HashSet::new();
        // canonical provider id -> id the node was created under
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut frontier: Vec<String> = vec![seed.to_string()];

        for level in 0..=params.depth {
            if frontier.is_empty() || graph.attributed_count() >= params.max_papers {
                break;
            }
            summary.levels += 1;
            debug!(level, frontier = frontier.len(), "Expanding citation level");

            let mut next = NextFrontier::default();

            for id in std::mem::take(&mut frontier) {
                if visited.contains(&id) || graph.attributed_count() >= params.max_papers {
                    continue;
                }

                let Some(paper) = self.fetch(&id, &mut summary).await else {
                    visited.insert(id);
                    continue;
                };

                let FetchedPaper {
                    record,
                    citations,
                    references,
                } = paper;

                if record.id != id && !graph.contains(&record.id) {
                    visited.insert(record.id.clone());
                    aliases.insert(record.id.clone(), id.clone());
                }

                graph.add_node(&id, record);
                summary.fetched += 1;

                if level < params.depth {
                    if params.direction.follows_citations() {
                        for citing in citations.iter().take(self.neighbor_limit) {
                            let citing = resolve(&aliases, citing);
                            graph.add_edge(citing, &id);
                            self.enqueue(citing, &visited, &graph, params, &mut next);
                        }
                    }

                    if params.direction.follows_references() {
                        for cited in references.iter().take(self.neighbor_limit) {
                            let cited = resolve(&aliases, cited);
                            graph.add_edge(&id, cited);
                            self.enqueue(cited, &visited, &graph, params, &mut next);
                        }
                    }
                }

                visited.insert(id);
            }

            frontier = next
                .order
                .into_iter()
                .filter(|id| !visited.contains(id))
                .collect();
        }

        info!(
            seed = %seed,
            depth = params.depth,
            direction = %params.direction,
            nodes = graph.attributed_count(),
            shadow_nodes = graph.shadow_count(),
            edges = graph.edge_count(),
            fetch_failures = summary.fetch_failures,
            absent = summary.absent,
            "Citation network built"
        );

        Ok(BuiltNetwork { graph, summary })
    }

    fn enqueue(
        &self,
        id: &str,
        visited: &HashSet<String>,
        graph: &CitationGraph,
        params: &BuildParams,
        next: &mut NextFrontier,
    ) {
        if !visited.contains(id) && graph.attributed_count() < params.max_papers {
            next.push(id);
        }
    }

    /// One provider lookup. Failures are logged and counted, never raised.
    async fn fetch(&self, id: &str, summary: &mut BuildSummary) -> Option<FetchedPaper> {
        let query = normalize(id);
        let start = Instant::now();
        let result = self.provider.fetch(&query).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(Some(paper)) => {
                metrics::record_fetch(elapsed, self.provider.name(), FetchOutcome::Found);
                Some(paper)
            }
            Ok(None) => {
                metrics::record_fetch(elapsed, self.provider.name(), FetchOutcome::Absent);
                debug!(id = %id, query = %query, "Paper not found, skipping");
                summary.absent += 1;
                None
            }
            Err(e) => {
                metrics::record_fetch(elapsed, self.provider.name(), FetchOutcome::Failed);
                warn!(
                    id = %id,
                    query = %query,
                    provider = self.provider.name(),
                    error = %e,
                    "Paper fetch failed, skipping"
                );
                summary.fetch_failures += 1;
                None
            }
        }
    }
}

fn resolve<'m>(aliases: &'m HashMap<String, String>, id: &'m str) -> &'m str {
    aliases.get(id).map(String::as_str).unwrap_or(id)
}
