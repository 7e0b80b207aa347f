//! Semantic Scholar Graph API client
//!
//! Base URL: https://api.semanticscholar.org/graph/v1
//! Unauthenticated clients are heavily rate limited, so every request is
//! paced through a token bucket and transient failures are retried.

use super::{MetadataProvider, ProviderQuery};
use crate::config::ProviderConfig;
use crate::errors::{AppError, Result};
use crate::models::{FetchedPaper, PublicationRecord};
use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoff};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::StatusCode;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Fields requested for a single paper, including neighbor ids
const PAPER_FIELDS: &str =
    "paperId,title,authors,year,venue,citationCount,abstract,citations.paperId,references.paperId";

/// Fields requested for search hits
const SEARCH_FIELDS: &str = "paperId,title,authors,year,venue,citationCount,abstract";

const PROVIDER_NAME: &str = "semantic_scholar";

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Semantic Scholar metadata provider
pub struct SemanticScholarProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    timeout: Duration,
    limiter: Option<Arc<DirectLimiter>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperPayload {
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<AuthorPayload>>,
    year: Option<i32>,
    venue: Option<String>,
    citation_count: Option<u64>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    citations: Option<Vec<PaperRefPayload>>,
    #[serde(default)]
    references: Option<Vec<PaperRefPayload>>,
}

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaperRefPayload {
    paper_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    data: Vec<PaperPayload>,
}

type RecordParts = (PublicationRecord, Vec<PaperRefPayload>, Vec<PaperRefPayload>);

impl PaperPayload {
    fn into_record(self, fallback_id: &str) -> RecordParts {
        let record = PublicationRecord {
            id: self.paper_id.unwrap_or_else(|| fallback_id.to_string()),
            title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            authors: self
                .authors
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| a.name)
                .collect(),
            year: self.year,
            venue: self.venue.filter(|v| !v.is_empty()),
            citation_count: self.citation_count,
            abstract_text: self.abstract_text.filter(|a| !a.is_empty()),
        };
        (
            record,
            self.citations.unwrap_or_default(),
            self.references.unwrap_or_default(),
        )
    }

    fn into_fetched(self, requested_id: &str) -> FetchedPaper {
        let (record, citations, references) = self.into_record(requested_id);
        FetchedPaper {
            record,
            citations: citations.into_iter().filter_map(|r| r.paper_id).collect(),
            references: references.into_iter().filter_map(|r| r.paper_id).collect(),
        }
    }
}

impl SemanticScholarProvider {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("citeforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let limiter = NonZeroU32::new(config.requests_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_retries: config.max_retries,
            timeout: config.timeout(),
            limiter,
        })
    }

    /// GET with pacing and retry. `Ok(None)` on 404.
    async fn get_with_retry(&self, url: &str, params: &[(&str, String)]) -> Result<Option<String>> {
        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_elapsed_time: Some(self.timeout * (self.max_retries + 1)),
            ..ExponentialBackoff::default()
        };

        let mut attempt = 0u32;
        retry_notify(
            policy,
            || {
                attempt += 1;
                let current = attempt;
                async move {
                    match self.get_once(url, params).await {
                        Ok(body) => Ok(body),
                        Err((err, true)) if current <= self.max_retries => {
                            Err(backoff::Error::transient(err))
                        }
                        Err((err, _)) => Err(backoff::Error::permanent(err)),
                    }
                }
            },
            |err: AppError, delay: Duration| {
                tracing::warn!(
                    provider = PROVIDER_NAME,
                    url = %url,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Metadata request failed, retrying"
                );
            },
        )
        .await
    }

    /// Single attempt. The flag marks errors worth retrying.
    async fn get_once(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Option<String>, (AppError, bool)> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let mut request = self.client.get(url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                let timeout_ms = self.timeout.as_millis() as u64;
                (AppError::UpstreamTimeout { timeout_ms }, true)
            } else {
                (AppError::HttpClient(e), true)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let transient = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            return Err((
                AppError::upstream(PROVIDER_NAME, format!("API error {}: {}", status, body)),
                transient,
            ));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| (AppError::HttpClient(e), true))
    }
}

#[async_trait]
impl MetadataProvider for SemanticScholarProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Option<FetchedPaper>> {
        let provider_id = query.as_provider_id();
        let url = format!("{}/paper/{}", self.base_url, provider_id);
        let params = [("fields", PAPER_FIELDS.to_string())];

        let Some(body) = self.get_with_retry(&url, &params).await? else {
            return Ok(None);
        };

        let payload: PaperPayload = serde_json::from_str(&body)?;
        Ok(Some(payload.into_fetched(&provider_id)))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PublicationRecord>> {
        let url = format!("{}/paper/search", self.base_url);
        let params = [
            ("query", query.to_string()),
            ("limit", limit.clamp(1, 100).to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
        ];

        let Some(body) = self.get_with_retry(&url, &params).await? else {
            return Ok(Vec::new());
        };

        let payload: SearchPayload = serde_json::from_str(&body)?;
        Ok(payload
            .data
            .into_iter()
            .filter(|p| p.paper_id.is_some())
            .map(|p| p.into_record("").0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    /// Stand-in for the Graph API paper endpoint, answering by id
    async fn paper_route(Path(id): Path<String>, State(hits): State<Arc<AtomicUsize>>) -> Response {
        let attempt = hits.fetch_add(1, Ordering::SeqCst) + 1;
        match id.as_str() {
            "missing" => StatusCode::NOT_FOUND.into_response(),
            "bad" => (StatusCode::BAD_REQUEST, "unrecognized field").into_response(),
            "down" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            "flaky" if attempt == 1 => StatusCode::TOO_MANY_REQUESTS.into_response(),
            _ => Json(serde_json::json!({
                "paperId": id,
                "title": "Served Paper",
                "citations": [{"paperId": "c1"}],
                "references": []
            }))
            .into_response(),
        }
    }

    async fn local_provider(max_retries: u32) -> (SemanticScholarProvider, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/paper/{id}", get(paper_route))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ProviderConfig {
            base_url: format!("http://{}", addr),
            requests_per_second: 0,
            timeout_secs: 5,
            max_retries,
            ..ProviderConfig::default()
        };
        (SemanticScholarProvider::new(&config).unwrap(), hits)
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let (provider, hits) = local_provider(3).await;

        let fetched = assert_ok!(provider.fetch(&ProviderQuery::Native("missing".into())).await);
        assert!(fetched.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        let (provider, hits) = local_provider(3).await;

        let fetched = assert_ok!(provider.fetch(&ProviderQuery::Native("flaky".into())).await);
        let fetched = fetched.unwrap();
        assert_eq!(fetched.record.id, "flaky");
        assert_eq!(fetched.citations, vec!["c1"]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (provider, hits) = local_provider(3).await;

        let err = assert_err!(provider.fetch(&ProviderQuery::Native("bad".into())).await);
        assert!(matches!(err, AppError::Upstream { .. }));
        assert!(err.to_string().contains("400"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_budget_spent() {
        let (provider, hits) = local_provider(1).await;

        let err = assert_err!(provider.fetch(&ProviderQuery::Native("down".into())).await);
        assert!(matches!(err, AppError::Upstream { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_client_creation() {
        let config = ProviderConfig {
            base_url: "https://api.semanticscholar.org/graph/v1/".into(),
            api_key: Some(String::new()),
            ..ProviderConfig::default()
        };
        let provider = SemanticScholarProvider::new(&config).unwrap();
        assert_eq!(provider.base_url, "https://api.semanticscholar.org/graph/v1");
        assert!(provider.api_key.is_none());
        assert!(provider.limiter.is_some());
    }

    #[test]
    fn test_zero_rps_disables_pacing() {
        let config = ProviderConfig {
            requests_per_second: 0,
            ..ProviderConfig::default()
        };
        let provider = SemanticScholarProvider::new(&config).unwrap();
        assert!(provider.limiter.is_none());
    }

    #[test]
    fn test_paper_payload_conversion() {
        let body = r#"{
            "paperId": "204e3073870fae3d05bcbc2f6a8e263d9b72e776",
            "title": "Attention is All you Need",
            "authors": [
                {"authorId": "1", "name": "Ashish Vaswani"},
                {"authorId": "2", "name": null}
            ],
            "year": 2017,
            "venue": "",
            "citationCount": 90000,
            "abstract": null,
            "citations": [{"paperId": "c1"}, {"paperId": null}, {"paperId": "c2"}],
            "references": [{"paperId": "r1"}]
        }"#;

        let payload: PaperPayload = serde_json::from_str(body).unwrap();
        let fetched = payload.into_fetched("arXiv:1706.03762");

        assert_eq!(fetched.record.id, "204e3073870fae3d05bcbc2f6a8e263d9b72e776");
        assert_eq!(fetched.record.authors, vec!["Ashish Vaswani"]);
        assert_eq!(fetched.record.year, Some(2017));
        assert!(fetched.record.venue.is_none());
        assert_eq!(fetched.citations, vec!["c1", "c2"]);
        assert_eq!(fetched.references, vec!["r1"]);
    }

    #[test]
    fn test_minimal_payload_uses_fallbacks() {
        let payload: PaperPayload = serde_json::from_str(r#"{"paperId": null}"#).unwrap();
        let fetched = payload.into_fetched("DOI:10.1/x");
        assert_eq!(fetched.record.id, "DOI:10.1/x");
        assert_eq!(fetched.record.title, "Unknown Title");
        assert!(fetched.citations.is_empty());
    }
}
