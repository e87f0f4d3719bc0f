//! Vector index retrieval
//!
//! Nearest-neighbour search and upserts against the Pinecone data plane.

use crate::http::{describe_send_error, read_json, with_scheme};
use crate::types::{RagError, RagResult, RetrievedChunk, VectorRecord};
use async_trait::async_trait;
use reqwest::Client;
use scholarly_core::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Pinecone REST API version sent with every request
pub const PINECONE_API_VERSION: &str = "2024-07";

/// A similarity-searchable store of embedded chunks
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` stored chunks closest to `vector`, best first.
    /// Matches without chunk text are skipped.
    async fn query(&self, vector: &[f32], top_k: usize) -> RagResult<Vec<RetrievedChunk>>;

    /// Write vectors to the index, returning how many were stored
    async fn upsert(&self, records: &[VectorRecord]) -> RagResult<usize>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

/// Data-plane client for a single Pinecone index
pub struct PineconeIndex {
    client: Client,
    host: String,
    api_key: Secret,
}

impl PineconeIndex {
    pub fn new(client: Client, host: &str, api_key: Secret) -> Self {
        Self {
            client,
            host: with_scheme(host),
            api_key,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", self.api_key.expose())
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
    }
}

/// Convert a raw match into a chunk, or `None` when it carries no text
fn into_chunk(m: QueryMatch) -> Option<RetrievedChunk> {
    let mut metadata = m.metadata.unwrap_or_default();

    let text = match metadata.remove("text") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => {
            warn!(id = %m.id, "Skipping match without chunk text");
            return None;
        }
    };

    let metadata: HashMap<String, String> = metadata
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    Some(RetrievedChunk {
        id: m.id,
        text,
        score: m.score,
        metadata,
    })
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> RagResult<Vec<RetrievedChunk>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .post("/query")
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_send_error("Pinecone query", e)))?;

        let body: QueryResponse = read_json("Pinecone query", response)
            .await
            .map_err(RagError::Retrieval)?;

        let total = body.matches.len();
        let chunks: Vec<RetrievedChunk> = body.matches.into_iter().filter_map(into_chunk).collect();

        debug!(
            matches = total,
            usable = chunks.len(),
            top_k = top_k,
            "Vector query completed"
        );

        Ok(chunks)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> RagResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let response = self
            .post("/vectors/upsert")
            .json(&UpsertRequest { vectors: records })
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_send_error("Pinecone upsert", e)))?;

        let body: UpsertResponse = read_json("Pinecone upsert", response)
            .await
            .map_err(RagError::Retrieval)?;

        debug!(
            sent = records.len(),
            upserted = body.upserted_count,
            "Upserted vectors"
        );

        Ok(body.upserted_count)
    }
}
