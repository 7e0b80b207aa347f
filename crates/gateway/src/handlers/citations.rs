//! Citation network analysis handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use citeforge_common::{
    errors::{AppError, Result},
    metrics::RequestMetrics,
    models::Direction,
};
use citeforge_network::{AnalysisReport, AnalysisRequest};
use serde::Deserialize;
use validator::Validate;

use super::validation_error;
use crate::AppState;

/// Analyze request; omitted bounds fall back to the `analysis` config
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Semantic Scholar id, DOI or arXiv id
    #[validate(length(min = 1, max = 256))]
    pub seed: String,

    #[validate(range(min = 1, max = 3))]
    pub depth: Option<u8>,

    /// citing_only, cited_by_only or both
    pub direction: Option<String>,

    #[validate(range(min = 1, max = 100))]
    pub max_papers: Option<usize>,
}

/// Build and analyze the citation network around a seed paper
pub async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>> {
    let metrics = RequestMetrics::start("POST", "/v2/citations/analyze");

    let result = run_analysis(&state, payload).await;

    metrics.finish(match &result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    });

    result.map(Json)
}

async fn run_analysis(
    state: &AppState,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<AnalysisReport> {
    let Json(request) = payload.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })?;

    request.validate().map_err(validation_error)?;

    let defaults = &state.config.analysis;
    let direction = match request.direction.as_deref() {
        Some(raw) => raw.parse::<Direction>().map_err(|message| AppError::Validation {
            message,
            field: Some("direction".to_string()),
        })?,
        None => defaults.default_direction,
    };

    let analysis = AnalysisRequest::new(request.seed)
        .with_depth(request.depth.unwrap_or(defaults.default_depth))
        .with_direction(direction)
        .with_max_papers(request.max_papers.unwrap_or(defaults.default_max_papers));

    state.analyzer.analyze(&analysis).await
}
