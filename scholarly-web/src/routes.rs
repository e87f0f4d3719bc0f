//! Route definitions for the scholarly web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes. Form endpoints accept paths with and without the
/// trailing slash.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Research chatbot
        .route("/chatbot/", post(handlers::chatbot))
        .route("/chatbot", post(handlers::chatbot))
        // Contact form
        .route("/contact-us-email/", post(handlers::contact_us_email))
        .route("/contact-us-email", post(handlers::contact_us_email))
}

/// OpenAPI document
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi::openapi_json))
}
