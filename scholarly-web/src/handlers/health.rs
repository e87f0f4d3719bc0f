//! Health check handler

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Liveness check. Reports the configured models without calling upstream services.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_model: state.pipeline.model().to_string(),
        index: state.config.pinecone.index_name.clone(),
        top_k: state.pipeline.config().top_k,
    })
}
