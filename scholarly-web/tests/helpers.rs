//! Test application built from in-memory pipeline and queue doubles

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use scholarly_core::AppConfig;
use scholarly_mail::{ContactEmailJob, ContactQueue, MailError, MailResult};
use scholarly_rag::{
    Embedder, LlmClient, RagConfig, RagError, RagPipeline, RagResult, RetrievedChunk,
    VectorIndex, VectorRecord,
};
use scholarly_web::{create_app, AppState};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub struct StubEmbedder {
    pub calls: CallLog,
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, inputs: &[String]) -> RagResult<Vec<Vec<f32>>> {
        self.calls.lock().unwrap().push("embed");
        Ok(inputs.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
    }

    fn dimension(&self) -> Option<usize> {
        Some(3)
    }
}

pub struct StubIndex {
    pub calls: CallLog,
    pub chunks: Vec<(&'static str, f32)>,
}

#[async_trait]
impl VectorIndex for StubIndex {
    async fn query(&self, _vector: &[f32], top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
        self.calls.lock().unwrap().push("query");
        Ok(self
            .chunks
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, (text, score))| RetrievedChunk {
                id: format!("chunk_{}", i),
                text: text.to_string(),
                score: *score,
                metadata: HashMap::new(),
            })
            .collect())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> RagResult<usize> {
        Ok(records.len())
    }
}

pub struct StubLlm {
    pub calls: CallLog,
    pub answer: Result<&'static str, &'static str>,
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, _prompt: &str) -> RagResult<String> {
        self.calls.lock().unwrap().push("complete");
        self.answer
            .map(str::to_string)
            .map_err(|e| RagError::Llm(e.to_string()))
    }

    fn model(&self) -> &str {
        "gpt-5-nano"
    }
}

/// Collects submitted jobs, optionally reporting a full queue
#[derive(Default)]
pub struct RecordingQueue {
    pub jobs: Mutex<Vec<ContactEmailJob>>,
    pub full: bool,
}

impl ContactQueue for RecordingQueue {
    fn submit(&self, job: ContactEmailJob) -> MailResult<()> {
        if self.full {
            return Err(MailError::QueueFull);
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("DEFAULT_FROM_EMAIL", "noreply@example.org"),
        ("PINECONE_API_KEY", "pc-key"),
        ("PINECONE_INDEX_NAME", "scholarly"),
        ("OPENAI_API_KEY", "sk-test"),
        ("FRONTEND_URL", "https://scholar.example.org"),
        ("LOGO_URL", "https://scholar.example.org/logo.png"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_map(vars).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub calls: CallLog,
    pub queue: Arc<RecordingQueue>,
}

pub struct TestAppBuilder {
    chunks: Vec<(&'static str, f32)>,
    answer: Result<&'static str, &'static str>,
    queue_full: bool,
    env: Vec<(&'static str, &'static str)>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            answer: Ok("I could not find that in the research corpus."),
            queue_full: false,
            env: Vec::new(),
            llm: None,
        }
    }

    pub fn chunks(mut self, chunks: Vec<(&'static str, f32)>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn answer(mut self, answer: &'static str) -> Self {
        self.answer = Ok(answer);
        self
    }

    pub fn failing_llm(mut self, message: &'static str) -> Self {
        self.answer = Err(message);
        self
    }

    /// Replace the stub LLM, e.g. with a client pointed at a mock server
    pub fn llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn queue_full(mut self) -> Self {
        self.queue_full = true;
        self
    }

    pub fn env(mut self, key: &'static str, value: &'static str) -> Self {
        self.env.push((key, value));
        self
    }

    pub fn build(self) -> TestApp {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let llm: Arc<dyn LlmClient> = match self.llm {
            Some(llm) => llm,
            None => Arc::new(StubLlm {
                calls: calls.clone(),
                answer: self.answer,
            }),
        };
        let pipeline = RagPipeline::new(
            RagConfig::default(),
            Arc::new(StubEmbedder {
                calls: calls.clone(),
            }),
            Arc::new(StubIndex {
                calls: calls.clone(),
                chunks: self.chunks,
            }),
            llm,
        );

        let queue = Arc::new(RecordingQueue {
            jobs: Mutex::new(Vec::new()),
            full: self.queue_full,
        });

        let config = Arc::new(test_config(&self.env));
        let state = AppState::new(config, Arc::new(pipeline), queue.clone());

        TestApp {
            router: create_app(state),
            calls,
            queue,
        }
    }
}

impl TestApp {
    pub async fn post_json(&self, uri: &str, body: &str) -> (u16, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (u16, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn jobs(&self) -> Vec<ContactEmailJob> {
        self.queue.jobs.lock().unwrap().clone()
    }
}
