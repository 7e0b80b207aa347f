//! CiteForge Common Library
//!
//! Shared code for the CiteForge crates including:
//! - Publication records returned by metadata providers
//! - The metadata provider abstraction (Semantic Scholar, in-memory)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod provider;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use models::{FetchedPaper, PublicationRecord};
pub use provider::{MetadataProvider, ProviderQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of citations or references consumed per paper
pub const DEFAULT_NEIGHBOR_LIMIT: usize = 20;

/// Hard upper bound on attributed papers in one network
pub const MAX_NETWORK_PAPERS: usize = 100;
