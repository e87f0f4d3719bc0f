//! Research chatbot handler

use super::types::{ChatbotRequest, ChatbotResponse, ErrorResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use scholarly_core::performance::measure_async;
use tracing::info;

/// Answer a question from the indexed research corpus
#[utoipa::path(
    post,
    path = "/api/chatbot/",
    tag = "Chatbot",
    summary = "Ask a question",
    description = "Answer a question using passages retrieved from the research corpus",
    request_body = ChatbotRequest,
    responses(
        (status = 200, description = "Question answered", body = ChatbotResponse),
        (status = 400, description = "Question missing or empty", body = ErrorResponse),
        (status = 502, description = "An upstream service failed", body = ErrorResponse)
    )
)]
pub async fn chatbot(
    State(state): State<AppState>,
    payload: Result<Json<ChatbotRequest>, JsonRejection>,
) -> ApiResult<Json<ChatbotResponse>> {
    let Json(request) = payload?;
    let question = request.question.unwrap_or_default();

    let response = measure_async("chatbot", state.pipeline.query(&question))
        .await
        .map_err(|e| ApiError::from_rag(e, state.debug()))?;

    info!(sources = response.sources.len(), "Chatbot question answered");
    Ok(Json(response.into()))
}
