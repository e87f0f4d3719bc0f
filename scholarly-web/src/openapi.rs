//! OpenAPI document for the scholarly web API

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    ChatbotRequest, ChatbotResponse, ContactRequest, ContactResponse, ErrorResponse,
    HealthResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scholarly Website API",
        version = "0.1.0",
        description = "Research chatbot and contact form backend"
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::chatbot,
        crate::handlers::contact_us_email,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ChatbotRequest,
            ChatbotResponse,
            ContactRequest,
            ContactResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Chatbot", description = "Questions answered from the research corpus"),
        (name = "Contact", description = "Contact form submissions"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
