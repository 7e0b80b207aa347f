//! Visualization export
//!
//! Exporters turn a finished network into an artifact a front end can draw.
//! The bundled exporter emits a node/edge JSON document.

use crate::graph::{CitationGraph, PaperNode};
use citeforge_common::errors::{AppError, Result};
use serde::Serialize;

const LABEL_LIMIT: usize = 30;
const MIN_NODE_SIZE: f64 = 10.0;
const MAX_NODE_SIZE: f64 = 50.0;

/// Renders a citation network
pub trait NetworkExporter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn export(&self, graph: &CitationGraph) -> Result<String>;
}

/// Node of the exported document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub size: f64,
    pub year: Option<i32>,
    pub citation_count: Option<u64>,
    pub attributed: bool,
}

/// Directed edge, citing paper first
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Node/edge JSON exporter
#[derive(Debug, Clone, Default)]
pub struct JsonGraphExporter {
    pretty: bool,
}

impl JsonGraphExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Build the document without serializing it
    pub fn document(&self, graph: &CitationGraph) -> GraphDocument {
        let max_citations = graph
            .nodes()
            .filter_map(|n| n.record().and_then(|r| r.citation_count))
            .max()
            .unwrap_or(0);

        let nodes = graph
            .nodes()
            .map(|node| graph_node(node, max_citations))
            .collect();

        let edges = graph
            .edges()
            .map(|(source, target)| GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
            })
            .collect();

        GraphDocument { nodes, edges }
    }
}

impl NetworkExporter for JsonGraphExporter {
    fn name(&self) -> &str {
        "json_graph"
    }

    fn export(&self, graph: &CitationGraph) -> Result<String> {
        let document = self.document(graph);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };

        rendered.map_err(|e| AppError::Export {
            message: e.to_string(),
        })
    }
}

fn graph_node(node: &PaperNode, max_citations: u64) -> GraphNode {
    let Some(record) = node.record() else {
        return GraphNode {
            id: node.id.clone(),
            label: truncate_label(&node.id),
            tooltip: node.id.clone(),
            size: MIN_NODE_SIZE,
            year: None,
            citation_count: None,
            attributed: false,
        };
    };

    let year = record
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let citations = record.citation_count.unwrap_or(0);

    let size = if max_citations == 0 {
        MIN_NODE_SIZE
    } else {
        MIN_NODE_SIZE + (citations as f64 / max_citations as f64) * (MAX_NODE_SIZE - MIN_NODE_SIZE)
    };

    GraphNode {
        id: node.id.clone(),
        label: truncate_label(&format!("{} ({})", record.title, year)),
        tooltip: format!(
            "{}\n{}\nYear: {}\nCitations: {}",
            record.title,
            record.author_line(),
            year,
            citations
        ),
        size,
        year: record.year,
        citation_count: record.citation_count,
        attributed: true,
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_LIMIT {
        let head: String = label.chars().take(LABEL_LIMIT).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}
