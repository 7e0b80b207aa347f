//! Network statistics

use crate::graph::CitationGraph;
use citeforge_common::errors::{AppError, Result};
use serde::Serialize;
use std::cmp::Reverse;

/// How many papers the most-cited list holds
pub const MOST_CITED_LIMIT: usize = 5;

/// Aggregate metrics for one network
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    /// Attributed papers
    pub nodes: usize,
    /// Citation edges, including those touching shadow nodes
    pub edges: usize,
    /// edges / max(1, nodes), two decimals
    pub average_citations: f64,
    pub most_cited_papers: Vec<MostCitedPaper>,
}

/// Entry of the most-cited list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostCitedPaper {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    /// In-degree within the network
    pub citation_count: usize,
}

/// Compute statistics. Fails when no paper carries attributes.
pub fn compute_stats(graph: &CitationGraph) -> Result<NetworkStats> {
    let nodes = graph.attributed_count();
    if nodes == 0 {
        return Err(AppError::EmptyNetwork {
            reason: "network has no attributed papers".to_string(),
        });
    }

    let edges = graph.edge_count();
    let average_citations = round2(edges as f64 / nodes.max(1) as f64);

    let mut ranked: Vec<(usize, Option<u64>, &str)> = graph
        .nodes()
        .filter_map(|node| {
            node.record()
                .map(|record| (graph.in_degree(&node.id), record.citation_count, node.id.as_str()))
        })
        .collect();

    // in-degree desc, external citation count desc (absent last), id asc
    ranked.sort_by_key(|&(degree, external, id)| (Reverse(degree), Reverse(external), id));

    let most_cited_papers = ranked
        .into_iter()
        .take(MOST_CITED_LIMIT)
        .filter_map(|(degree, _, id)| {
            let record = graph.get(id)?.record()?;
            Some(MostCitedPaper {
                id: id.to_string(),
                title: record.title.clone(),
                authors: record.author_line(),
                year: record.year,
                citation_count: degree,
            })
        })
        .collect();

    Ok(NetworkStats {
        nodes,
        edges,
        average_citations,
        most_cited_papers,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
