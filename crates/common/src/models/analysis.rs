//! Request-level options for network analysis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which citation links the network builder follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Follow reference lists (papers the current paper cites)
    #[serde(alias = "citing")]
    CitingOnly,
    /// Follow citation lists (papers citing the current paper)
    #[serde(alias = "cited_by")]
    CitedByOnly,
    #[default]
    Both,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::CitingOnly => "citing_only",
            Direction::CitedByOnly => "cited_by_only",
            Direction::Both => "both",
        }
    }

    /// Whether reference lists are expanded
    pub fn follows_references(&self) -> bool {
        matches!(self, Direction::CitingOnly | Direction::Both)
    }

    /// Whether citation lists are expanded
    pub fn follows_citations(&self) -> bool {
        matches!(self, Direction::CitedByOnly | Direction::Both)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citing_only" | "citing" => Ok(Direction::CitingOnly),
            "cited_by_only" | "cited_by" => Ok(Direction::CitedByOnly),
            "both" => Ok(Direction::Both),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Community detection strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringStrategy {
    /// Louvain modularity optimisation
    #[default]
    Modularity,
    /// Connected components of the undirected projection
    ConnectedComponents,
}

impl ClusteringStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringStrategy::Modularity => "modularity",
            ClusteringStrategy::ConnectedComponents => "connected_components",
        }
    }
}

impl fmt::Display for ClusteringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_accepts_short_aliases() {
        let d: Direction = serde_json::from_str("\"cited_by\"").unwrap();
        assert_eq!(d, Direction::CitedByOnly);
        assert_eq!("citing".parse::<Direction>().unwrap(), Direction::CitingOnly);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_expansion_flags() {
        assert!(Direction::Both.follows_citations());
        assert!(Direction::Both.follows_references());
        assert!(!Direction::CitingOnly.follows_citations());
        assert!(!Direction::CitedByOnly.follows_references());
    }
}
