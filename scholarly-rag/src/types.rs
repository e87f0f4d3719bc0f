//! Type definitions for the RAG system
//!
//! This module defines the core types used throughout the query pipeline
//! and the ingestion tooling.

use scholarly_core::ScholarlyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default instructional preamble placed before the retrieved context
pub const DEFAULT_PREAMBLE: &str = "You are a research assistant for a scholarly website. \
Answer the question using only the context passages below. \
If the context does not contain the answer, say that you could not find it.";

/// Configuration for the query pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Number of chunks requested from the vector index
    pub top_k: usize,
    /// Instructional text that opens every prompt
    pub preamble: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

/// A stored chunk returned by the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Identifier of the stored vector
    pub id: String,
    /// Text content of the chunk
    pub text: String,
    /// Similarity score (higher is closer)
    pub score: f32,
    /// Remaining metadata stored with the vector, stringified
    pub metadata: HashMap<String, String>,
}

/// Answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    /// Retrieved chunk texts in similarity order
    pub sources: Vec<String>,
}

/// Description of a vector index as reported by the control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

impl IndexDescription {
    pub fn is_ready(&self) -> bool {
        !self.host.is_empty() && self.status.as_ref().map(|s| s.ready).unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

/// A segment of a source document produced by the chunker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub chunk_index: usize,
    /// Character offset where the chunk window starts
    pub start: usize,
    /// Character offset where the chunk window ends (exclusive)
    pub end: usize,
}

/// A vector ready to be written to the index
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Error types for the RAG system
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Core error: {0}")]
    Core(Box<ScholarlyError>),
}

impl RagError {
    /// Whether the failure came from an external service
    pub fn is_upstream(&self) -> bool {
        match self {
            RagError::Embedding(_) | RagError::Retrieval(_) | RagError::Llm(_) => true,
            RagError::Core(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

impl From<ScholarlyError> for RagError {
    fn from(err: ScholarlyError) -> Self {
        RagError::Core(Box::new(err))
    }
}

pub type RagResult<T> = Result<T, RagError>;
