//! Scholarly Web Server
//!
//! HTTP API for the scholarly website: the research chatbot and the contact
//! form acknowledgement endpoint.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::{ApiError, ApiResult};
pub use server::{ScholarlyServer, ScholarlyServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, ORIGIN, USER_AGENT},
        HeaderName, HeaderValue, Method,
    },
    Router,
};
use scholarly_core::ScholarlyError;
use scholarly_mail::MailError;
use scholarly_rag::RagError;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::docs_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::allowed_hosts,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// CORS policy for the configured frontend origins. Credentials are allowed,
/// so `*` mirrors the request origin instead of sending a wildcard.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::DELETE,
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::POST,
            Method::PUT,
        ])
        .allow_credentials(true)
        .allow_headers([
            ACCEPT,
            ACCEPT_ENCODING,
            AUTHORIZATION,
            CONTENT_TYPE,
            ORIGIN,
            USER_AGENT,
            HeaderName::from_static("x-csrftoken"),
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("RAG setup error: {0}")]
    Rag(#[from] RagError),

    #[error("Mail setup error: {0}")]
    Mail(#[from] MailError),

    #[error("Configuration error: {0}")]
    Config(#[from] ScholarlyError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
