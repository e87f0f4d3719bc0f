//! Embedding generation
//!
//! Converts text into vectors through the OpenAI embeddings endpoint. Requests
//! are posted directly so the `dimensions` field can be set for indexes
//! smaller than the model's native size.

use crate::http::{describe_send_error, read_json};
use crate::types::{RagError, RagResult};
use async_trait::async_trait;
use reqwest::Client;
use scholarly_core::{normalize_model_name, OpenAiSettings, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Embedding model used when the index was built with 1024-dimensional vectors
pub const COMPACT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Converts text into embedding vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in input order
    async fn embed(&self, inputs: &[String]) -> RagResult<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, input: &str) -> RagResult<Vec<f32>> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("no embedding returned".to_string()))
    }

    /// Dimension of the vectors produced, when known
    fn dimension(&self) -> Option<usize>;
}

/// Native output dimension of the OpenAI embedding models
pub fn native_dimension(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// Pick the embedding model and requested dimension for an index.
///
/// A 1024-dimensional index always uses `text-embedding-3-small` reduced to
/// 1024 dimensions. Other sizes keep the configured model and only request a
/// reduced dimension when it differs from the model's native one.
pub fn select_model(configured: &str, index_dimension: usize) -> (String, Option<usize>) {
    let configured = normalize_model_name(configured);

    if index_dimension == 1024 {
        return (COMPACT_EMBEDDING_MODEL.to_string(), Some(1024));
    }

    match native_dimension(&configured) {
        Some(native) if native == index_dimension => (configured, None),
        _ => (configured, Some(index_dimension)),
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-backed embedder
pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    api_key: Secret,
    model: String,
    dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    /// Create an embedder producing vectors of the index's dimension
    pub fn with_client(client: Client, settings: &OpenAiSettings, index_dimension: usize) -> Self {
        let (model, dimensions) = select_model(&settings.embedding_model, index_dimension);

        debug!(
            model = %model,
            dimensions = ?dimensions,
            index_dimension = index_dimension,
            "Configured embedding model"
        );

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model,
            dimensions,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, inputs: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, count = inputs.len(), "Requesting embeddings");

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(describe_send_error("OpenAI embeddings", e)))?;

        let mut body: EmbeddingResponse = read_json("OpenAI embeddings", response)
            .await
            .map_err(RagError::Embedding)?;

        if body.data.len() != inputs.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, received {}",
                inputs.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimension(&self) -> Option<usize> {
        self.dimensions.or_else(|| native_dimension(&self.model))
    }
}
