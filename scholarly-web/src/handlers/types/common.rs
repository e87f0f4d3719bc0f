//! Common types used across multiple handlers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "gpt-5-nano")]
    pub llm_model: String,
    /// Name of the vector index queried for context
    #[schema(example = "scholarly")]
    pub index: String,
    pub top_k: usize,
}

/// Error payload returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Question is required.")]
    pub error: String,
}
