//! Citation graph store
//!
//! Nodes live in a petgraph arena addressed by stable `NodeIndex` handles,
//! with an id -> handle table on the side. A node is either attributed (its
//! record was fetched) or a shadow: an edge endpoint that was never fetched.

use citeforge_common::PublicationRecord;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction as EdgeDirection;
use std::collections::{HashMap, HashSet};

/// Whether a node carries fetched metadata
#[derive(Debug, Clone, PartialEq)]
pub enum NodeStatus {
    Attributed(PublicationRecord),
    Shadow,
}

/// A paper position in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct PaperNode {
    pub id: String,
    pub status: NodeStatus,
}

impl PaperNode {
    pub fn record(&self) -> Option<&PublicationRecord> {
        match &self.status {
            NodeStatus::Attributed(record) => Some(record),
            NodeStatus::Shadow => None,
        }
    }

    pub fn is_attributed(&self) -> bool {
        matches!(self.status, NodeStatus::Attributed(_))
    }

    pub fn title(&self) -> Option<&str> {
        self.record().map(|r| r.title.as_str())
    }
}

/// In-memory directed citation graph (citing -> cited)
#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    graph: DiGraph<PaperNode, ()>,
    index: HashMap<String, NodeIndex>,
    attributed: usize,
}

impl CitationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a node with fetched attributes
    pub fn add_node(&mut self, id: &str, record: PublicationRecord) -> NodeIndex {
        let handle = self.ensure_node(id);
        let node = &mut self.graph[handle];
        if !node.is_attributed() {
            self.attributed += 1;
        }
        node.status = NodeStatus::Attributed(record);
        handle
    }

    /// Handle for `id`, creating a shadow node when unknown
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&handle) = self.index.get(id) {
            return handle;
        }
        let handle = self.graph.add_node(PaperNode {
            id: id.to_string(),
            status: NodeStatus::Shadow,
        });
        self.index.insert(id.to_string(), handle);
        handle
    }

    /// Add a citation edge. Returns false when it already existed.
    pub fn add_edge(&mut self, citing: &str, cited: &str) -> bool {
        let source = self.ensure_node(citing);
        let target = self.ensure_node(cited);
        if self.graph.contains_edge(source, target) {
            return false;
        }
        self.graph.add_edge(source, target, ());
        true
    }

    /// All nodes, shadows included
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn attributed_count(&self) -> usize {
        self.attributed
    }

    pub fn shadow_count(&self) -> usize {
        self.node_count() - self.attributed
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn handle(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&PaperNode> {
        self.handle(id).map(|h| &self.graph[h])
    }

    pub fn node(&self, handle: NodeIndex) -> &PaperNode {
        &self.graph[handle]
    }

    /// Number of papers in the graph citing `id`
    pub fn in_degree(&self, id: &str) -> usize {
        self.handle(id)
            .map(|h| self.graph.neighbors_directed(h, EdgeDirection::Incoming).count())
            .unwrap_or(0)
    }

    /// Number of papers in the graph cited by `id`
    pub fn out_degree(&self, id: &str) -> usize {
        self.handle(id)
            .map(|h| self.graph.neighbors_directed(h, EdgeDirection::Outgoing).count())
            .unwrap_or(0)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &PaperNode> {
        self.graph.node_weights()
    }

    /// Edges as (citing, cited) ids in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
            )
        })
    }

    /// Edges as (citing, cited) handles in insertion order
    pub fn edge_handles(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    /// Handles of the papers cited by `handle`
    pub fn successors(&self, handle: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(handle, EdgeDirection::Outgoing)
    }

    /// Handles of the papers citing `handle`
    pub fn predecessors(&self, handle: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(handle, EdgeDirection::Incoming)
    }

    /// Induced subgraph over `ids`, keeping node and edge insertion order
    pub fn subgraph<'a, I>(&self, ids: I) -> CitationGraph
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = ids.into_iter().collect();
        let mut sub = CitationGraph::new();

        for node in self.nodes().filter(|n| keep.contains(n.id.as_str())) {
            match &node.status {
                NodeStatus::Attributed(record) => {
                    sub.add_node(&node.id, record.clone());
                }
                NodeStatus::Shadow => {
                    sub.ensure_node(&node.id);
                }
            }
        }

        for (citing, cited) in self.edges() {
            if keep.contains(citing) && keep.contains(cited) {
                sub.add_edge(citing, cited);
            }
        }

        sub
    }
}
