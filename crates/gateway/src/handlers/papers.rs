//! Paper lookup handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use citeforge_common::{
    errors::{AppError, Result},
    metrics::RequestMetrics,
    PublicationRecord,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use super::validation_error;
use crate::AppState;

/// Search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 500))]
    pub query: String,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
}

fn default_limit() -> usize { 10 }

/// Search response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub provider: String,
    pub total_results: usize,
    pub results: Vec<PublicationRecord>,
    pub processing_time_ms: u64,
}

/// Find candidate seed papers by title
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let metrics = RequestMetrics::start("GET", "/v2/papers/search");

    let result = run_search(&state, params).await;

    metrics.finish(match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    });

    result.map(Json)
}

async fn run_search(
    state: &AppState,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<SearchResponse> {
    let start = Instant::now();

    let Query(params) = params.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })?;
    params.validate().map_err(validation_error)?;

    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation {
            message: "query must contain non-whitespace characters".to_string(),
            field: Some("query".to_string()),
        });
    }

    let provider = state.analyzer.provider();
    let results = provider.search(query, params.limit).await?;

    Ok(SearchResponse {
        query: params.query,
        provider: provider.name().to_string(),
        total_results: results.len(),
        results,
        processing_time_ms: start.elapsed().as_millis() as u64,
    })
}
