//! Shared HTTP plumbing for the upstream API clients

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest upstream error body kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Build the HTTP client shared by the upstream clients
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("scholarly/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Check the status of an upstream response and decode its JSON body.
///
/// Failures are returned as plain messages; callers wrap them in the
/// error variant matching the pipeline step.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &str,
    response: Response,
) -> Result<T, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!(
            "{} returned {}: {}",
            service,
            status,
            truncate(&body, MAX_ERROR_BODY)
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("{} returned a malformed response: {}", service, e))
}

pub(crate) fn describe_send_error(service: &str, err: reqwest::Error) -> String {
    if err.is_timeout() {
        format!("{} request timed out", service)
    } else if err.is_connect() {
        format!("could not connect to {}: {}", service, err)
    } else {
        format!("{} request failed: {}", service, err)
    }
}

/// Ensure a host reported without a scheme is addressed over HTTPS
pub(crate) fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
