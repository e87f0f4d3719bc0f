//! Request middleware

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Reject requests whose `Host` header is not in `ALLOWED_HOSTS`.
///
/// `*` allows any host; an entry starting with `.` matches the domain and
/// all of its subdomains.
pub async fn allowed_hosts(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allowed = &state.config.server.allowed_hosts;
    if allowed.iter().any(|pattern| pattern == "*") {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(strip_port)
        .map(str::to_ascii_lowercase);

    match host {
        Some(host) if host_allowed(&host, allowed) => next.run(request).await,
        other => {
            warn!(host = ?other, "Rejected request with disallowed Host header");
            ApiError::BadRequest("Invalid Host header.".to_string()).into_response()
        }
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, _port)) => name,
        None => host,
    }
}

fn host_allowed(host: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        match pattern.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(&pattern),
            None => host == pattern,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.org:8000"), "example.org");
        assert_eq!(strip_port("example.org"), "example.org");
        assert_eq!(strip_port("[::1]:8000"), "[::1]");
    }

    #[test]
    fn test_exact_and_subdomain_patterns() {
        let hosts = allowed(&["api.example.org", ".scholar.example.org"]);

        assert!(host_allowed("api.example.org", &hosts));
        assert!(host_allowed("scholar.example.org", &hosts));
        assert!(host_allowed("www.scholar.example.org", &hosts));
        assert!(!host_allowed("evil.example.org", &hosts));
        assert!(!host_allowed("notscholar.example.org", &hosts));
    }
}
