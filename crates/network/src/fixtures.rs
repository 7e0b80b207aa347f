//! Shared test fixtures

use crate::graph::CitationGraph;
use citeforge_common::provider::InMemoryProvider;
use citeforge_common::{FetchedPaper, PublicationRecord};

pub fn record(id: &str, title: &str, citation_count: u64) -> PublicationRecord {
    PublicationRecord {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec![format!("Author {}", id)],
        year: Some(2020),
        venue: None,
        citation_count: Some(citation_count),
        abstract_text: None,
    }
}

pub fn paper(id: &str, title: &str, citation_count: u64) -> FetchedPaper {
    FetchedPaper::new(record(id, title, citation_count))
}

/// Seed `A` without references, cited by `B` and `C`
pub fn star_cited_by() -> InMemoryProvider {
    InMemoryProvider::new()
        .with_paper(paper("A", "Paper A", 40).cited_by(["B", "C"]))
        .with_paper(paper("B", "Paper B", 3).citing(["A"]))
        .with_paper(paper("C", "Paper C", 7).citing(["A"]))
}

/// Two citation triangles joined by the single link a3 -> b1.
/// Seeding `a3` with depth 2 in both directions attributes every paper;
/// b2 -> b3 stays undiscovered since the last level is never expanded.
pub fn two_triangles_provider() -> InMemoryProvider {
    InMemoryProvider::new()
        .with_paper(paper("a1", "Paper a1", 1).citing(["a2", "a3"]))
        .with_paper(paper("a2", "Paper a2", 20).citing(["a3"]).cited_by(["a1"]))
        .with_paper(paper("a3", "Paper a3", 30).citing(["b1"]).cited_by(["a1", "a2"]))
        .with_paper(paper("b1", "Paper b1", 10).citing(["b2", "b3"]).cited_by(["a3"]))
        .with_paper(paper("b2", "Paper b2", 5).citing(["b3"]).cited_by(["b1"]))
        .with_paper(paper("b3", "Paper b3", 50).cited_by(["b1", "b2"]))
}

/// The same two triangles built directly, nodes inserted a1..b3
pub fn two_triangles() -> CitationGraph {
    let mut graph = CitationGraph::new();
    for (id, count) in [("a1", 1), ("a2", 20), ("a3", 30), ("b1", 10), ("b2", 5), ("b3", 50)] {
        graph.add_node(id, record(id, &format!("Paper {}", id), count));
    }
    for (citing, cited) in [
        ("a1", "a2"),
        ("a1", "a3"),
        ("a2", "a3"),
        ("a3", "b1"),
        ("b1", "b2"),
        ("b1", "b3"),
        ("b2", "b3"),
    ] {
        graph.add_edge(citing, cited);
    }
    graph
}
