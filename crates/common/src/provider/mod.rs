//! Metadata provider abstraction
//!
//! A provider resolves an identifier to a publication record (with its
//! citation and reference id lists) and answers free-text lookups:
//! - Semantic Scholar Graph API
//! - In-memory fixtures (tests, offline runs)

mod semantic_scholar;

pub use semantic_scholar::SemanticScholarProvider;

use crate::config::ProviderConfig;
use crate::errors::{AppError, Result};
use crate::models::{FetchedPaper, PublicationRecord};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Canonical identifier form understood by providers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderQuery {
    /// Digital Object Identifier, without the `DOI:` scheme
    Doi(String),
    /// Pre-print catalog id, without the `arXiv:` scheme
    Preprint(String),
    /// Provider-native paper id
    Native(String),
}

impl ProviderQuery {
    /// Identifier as placed in a provider lookup path
    pub fn as_provider_id(&self) -> String {
        match self {
            ProviderQuery::Doi(doi) => format!("DOI:{}", doi),
            ProviderQuery::Preprint(id) => format!("arXiv:{}", id),
            ProviderQuery::Native(id) => id.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderQuery::Doi(_) => "doi",
            ProviderQuery::Preprint(_) => "preprint",
            ProviderQuery::Native(_) => "native",
        }
    }
}

impl fmt::Display for ProviderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_provider_id())
    }
}

/// Trait for publication metadata lookup
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name used in logs and metrics
    fn name(&self) -> &str;

    /// Fetch one paper. `Ok(None)` means the provider does not know the id.
    async fn fetch(&self, query: &ProviderQuery) -> Result<Option<FetchedPaper>>;

    /// Ranked candidate records for a free-text query
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PublicationRecord>>;
}

/// In-memory provider backed by fixtures
///
/// Lookups are keyed by `ProviderQuery::as_provider_id`, so a paper added
/// with id `abc` answers `Native("abc")`, and aliases map `DOI:...` or
/// `arXiv:...` keys onto stored papers.
#[derive(Default)]
pub struct InMemoryProvider {
    papers: HashMap<String, FetchedPaper>,
    aliases: HashMap<String, String>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paper(mut self, paper: FetchedPaper) -> Self {
        self.papers.insert(paper.record.id.clone(), paper);
        self
    }

    /// Provider seeded from a JSON array of fetched papers
    pub fn from_json(json: &str) -> Result<Self> {
        let papers: Vec<FetchedPaper> = serde_json::from_str(json)?;
        Ok(papers
            .into_iter()
            .fold(Self::new(), |provider, paper| provider.with_paper(paper)))
    }

    /// Provider seeded from a fixture file, see [`InMemoryProvider::from_json`]
    pub fn from_fixtures(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AppError::Configuration {
            message: format!("cannot read provider fixtures {}: {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }

    /// Resolve `provider_id` (e.g. `DOI:10.1/x`) to a stored paper id
    pub fn with_alias(
        mut self,
        provider_id: impl Into<String>,
        paper_id: impl Into<String>,
    ) -> Self {
        self.aliases.insert(provider_id.into(), paper_id.into());
        self
    }

    /// Make lookups of `provider_id` fail with an upstream error
    pub fn with_failure(mut self, provider_id: impl Into<String>) -> Self {
        self.failures.insert(provider_id.into());
        self
    }

    /// Provider ids requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

#[async_trait]
impl MetadataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Option<FetchedPaper>> {
        let key = query.as_provider_id();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key.clone());
        }

        if self.failures.contains(&key) {
            return Err(AppError::upstream(self.name(), format!("forced failure for {}", key)));
        }

        let id = self.aliases.get(&key).unwrap_or(&key);
        Ok(self.papers.get(id).cloned())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PublicationRecord>> {
        let needle = query.to_lowercase();
        let mut matches: Vec<PublicationRecord> = self
            .papers
            .values()
            .filter(|p| p.record.title.to_lowercase().contains(&needle))
            .map(|p| p.record.clone())
            .collect();

        matches.sort_by(|a, b| {
            b.citation_count
                .cmp(&a.citation_count)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(limit);
        Ok(matches)
    }
}

/// Create a provider based on configuration
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn MetadataProvider>> {
    match config.kind.as_str() {
        "semantic_scholar" => Ok(Arc::new(SemanticScholarProvider::new(config)?)),
        "mock" | "in_memory" => {
            let path = config.fixtures_path.as_deref().ok_or_else(|| AppError::Configuration {
                message: format!("provider kind '{}' needs provider.fixtures_path", config.kind),
            })?;
            let provider = InMemoryProvider::from_fixtures(path)?;
            tracing::info!(path, papers = provider.len(), "Loaded in-memory provider fixtures");
            Ok(Arc::new(provider))
        }
        other => Err(AppError::Configuration {
            message: format!("unknown metadata provider '{}'", other),
        }),
    }
}
