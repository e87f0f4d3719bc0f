//! HTTP API tests run in-process against the axum router

mod helpers;

use axum::{body::Body, http::Request};
use helpers::{test_config, TestAppBuilder};
use scholarly_rag::OpenAiChatClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_chatbot_answers_with_sources_in_order() {
    let app = TestAppBuilder::new()
        .chunks(vec![("Chunk A", 0.9), ("Chunk B", 0.8)])
        .answer("The research focuses on X.")
        .build();

    let (status, body) = app
        .post_json(
            "/api/chatbot/",
            r#"{"question": "What is the main topic of the research?"}"#,
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "answer": "The research focuses on X.",
            "sources": ["Chunk A", "Chunk B"]
        })
    );
    assert_eq!(app.calls(), vec!["embed", "query", "complete"]);
}

#[tokio::test]
async fn test_chatbot_accepts_path_without_trailing_slash() {
    let app = TestAppBuilder::new().answer("Yes.").build();

    let (status, body) = app
        .post_json("/api/chatbot", r#"{"question": "Is there a lab?"}"#)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["answer"], "Yes.");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_chatbot_rejects_blank_question() {
    let app = TestAppBuilder::new().build();

    for payload in [r#"{"question": "   "}"#, r#"{}"#, r#"{"question": null}"#] {
        let (status, body) = app.post_json("/api/chatbot/", payload).await;
        assert_eq!(status, 400, "payload {}", payload);
        assert_eq!(body["error"], "Question is required.");
    }

    assert!(app.calls().is_empty());
}

#[tokio::test]
async fn test_chatbot_malformed_json_is_bad_request() {
    let app = TestAppBuilder::new().build();

    let (status, body) = app.post_json("/api/chatbot/", "{not json").await;

    assert_eq!(status, 400);
    assert!(body["error"].is_string());
    assert!(app.calls().is_empty());
}

#[tokio::test]
async fn test_chatbot_upstream_failure_is_bad_gateway() {
    let app = TestAppBuilder::new()
        .chunks(vec![("Chunk A", 0.9)])
        .failing_llm("503 Service Unavailable")
        .build();

    let (status, body) = app
        .post_json("/api/chatbot/", r#"{"question": "Who is Dr. Smith?"}"#)
        .await;

    assert_eq!(status, 502);
    assert!(body["error"].is_string());
    assert!(!body["error"].as_str().unwrap_or_default().contains("503"));
}

#[tokio::test]
async fn test_chatbot_upstream_detail_shown_in_debug_mode() {
    let app = TestAppBuilder::new()
        .failing_llm("503 Service Unavailable")
        .env("DEBUG", "True")
        .build();

    let (status, body) = app
        .post_json("/api/chatbot/", r#"{"question": "Who is Dr. Smith?"}"#)
        .await;

    assert_eq!(status, 502);
    assert!(body["error"].as_str().unwrap_or_default().contains("503"));
}

#[tokio::test]
async fn test_chatbot_llm_timeout_is_bad_gateway() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "id": "chatcmpl-test",
                    "object": "chat.completion",
                    "created": 1_700_000_000,
                    "model": "gpt-5-nano",
                    "choices": [{
                        "index": 0,
                        "message": { "role": "assistant", "content": "too late" },
                        "finish_reason": "stop"
                    }]
                }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&openai)
        .await;

    let base_url = openai.uri();
    let config = test_config(&[("OPENAI_BASE_URL", base_url.as_str())]);
    let llm = OpenAiChatClient::connect(&config.openai, Duration::from_millis(300))
        .await
        .unwrap();

    let app = TestAppBuilder::new()
        .chunks(vec![("Chunk A", 0.9)])
        .llm(Arc::new(llm))
        .build();

    let (status, body) = app
        .post_json("/api/chatbot/", r#"{"question": "Who is Dr. Smith?"}"#)
        .await;

    assert_eq!(status, 502);
    assert!(body["error"].is_string());
    assert_eq!(app.calls(), vec!["embed", "query"]);
}

#[tokio::test]
async fn test_contact_enqueues_one_job() {
    let app = TestAppBuilder::new().build();

    let (status, body) = app
        .post_json(
            "/api/contact-us-email/",
            r#"{"email": "ana@example.org", "subject": "Collaboration", "full_name": "Ana Lima"}"#,
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "message": "Email successfully processed." }));

    let jobs = app.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].to_email, "ana@example.org");
    assert_eq!(jobs[0].subject, "Collaboration");
    assert_eq!(jobs[0].context.recipient_name, "Ana Lima");
    assert_eq!(jobs[0].context.website_url, "https://scholar.example.org");
    assert_eq!(jobs[0].context.logo_url, "https://scholar.example.org/logo.png");
}

#[tokio::test]
async fn test_contact_missing_email_enqueues_nothing() {
    let app = TestAppBuilder::new().build();

    let (status, body) = app
        .post_json(
            "/api/contact-us-email",
            r#"{"subject": "Collaboration", "full_name": "Ana Lima"}"#,
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Email is required.");
    assert!(app.jobs().is_empty());
}

#[tokio::test]
async fn test_contact_invalid_email_rejected() {
    let app = TestAppBuilder::new().build();

    let (status, _) = app
        .post_json(
            "/api/contact-us-email/",
            r#"{"email": "ana-at-example", "subject": "Hi", "full_name": "Ana"}"#,
        )
        .await;

    assert_eq!(status, 400);
    assert!(app.jobs().is_empty());
}

#[tokio::test]
async fn test_contact_full_queue_is_unavailable() {
    let app = TestAppBuilder::new().queue_full().build();

    let (status, body) = app
        .post_json(
            "/api/contact-us-email/",
            r#"{"email": "ana@example.org", "subject": "Hi", "full_name": "Ana"}"#,
        )
        .await;

    assert_eq!(status, 503);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let app = TestAppBuilder::new().build();

    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert_eq!(body["llm_model"], "gpt-5-nano");
    assert_eq!(body["index"], "scholarly");
    assert_eq!(body["top_k"], 5);
    assert!(app.calls().is_empty());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestAppBuilder::new().build();

    let (status, body) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, 200);
    assert!(body["paths"]["/api/chatbot/"].is_object());
}

#[tokio::test]
async fn test_disallowed_host_rejected() {
    let app = TestAppBuilder::new()
        .env("ALLOWED_HOSTS", "api.scholar.example.org")
        .build();

    let request = Request::builder()
        .uri("/api/health")
        .header("host", "attacker.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid Host header.");

    let request = Request::builder()
        .uri("/api/health")
        .header("host", "api.scholar.example.org:443")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_cors_preflight_for_frontend_origin() {
    let app = TestAppBuilder::new().build();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/chatbot/")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}
