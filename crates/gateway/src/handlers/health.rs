//! Health check handlers

use axum::{extract::State, Json};
use citeforge_network::community;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub provider: CheckResult,
    pub clustering: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: citeforge_common::VERSION.to_string(),
    })
}

/// Readiness probe - reports the provider in use and the clustering strategy
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let provider = CheckResult {
        status: "up".to_string(),
        detail: Some(state.analyzer.provider().name().to_string()),
    };

    // A missing strategy degrades the output, it does not block traffic
    let preferred = state.config.analysis.clustering;
    let (effective, fallback) = community::resolve_strategy(preferred);
    let clustering = CheckResult {
        status: if fallback { "degraded" } else { "up" }.to_string(),
        detail: Some(effective.to_string()),
    };

    Json(ReadyResponse {
        status: "ready".to_string(),
        checks: HealthChecks { provider, clustering },
    })
}
