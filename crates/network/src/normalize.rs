//! Identifier normalization
//!
//! Free-form references (DOIs, arXiv ids or URLs, native ids) are mapped to
//! the query form the metadata provider expects. No syntax checks: a bad id
//! simply fails at fetch time.

use citeforge_common::ProviderQuery;

const DOI_PREFIX: &str = "10.";
const PREPRINT_SCHEME: &str = "arXiv:";
const PREPRINT_CATALOG: &str = "arxiv";

/// Map a raw reference string to a provider query
pub fn normalize(raw: &str) -> ProviderQuery {
    if raw.starts_with(DOI_PREFIX) {
        return ProviderQuery::Doi(raw.to_string());
    }

    if let Some(id) = raw.strip_prefix(PREPRINT_SCHEME) {
        return ProviderQuery::Preprint(id.to_string());
    }

    if raw.to_lowercase().contains(PREPRINT_CATALOG) {
        let segment = raw.rsplit('/').next().unwrap_or(raw);
        return ProviderQuery::Preprint(segment.to_string());
    }

    ProviderQuery::Native(raw.to_string())
}
