//! RAG pipeline implementation
//!
//! Answers a question by embedding it, retrieving the closest chunks from the
//! vector index, assembling a prompt and asking the LLM.

use crate::embeddings::{Embedder, OpenAiEmbedder};
use crate::http::build_client;
use crate::llm_client::{LlmClient, OpenAiChatClient};
use crate::prompt::PromptBuilder;
use crate::retriever::{PineconeIndex, VectorIndex};
use crate::storage::IndexManager;
use crate::types::{AnswerResponse, RagConfig, RagError, RagResult, RetrievedChunk};
use scholarly_core::{log_operation_start, log_operation_success, AppConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main RAG pipeline
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmClient>,
    prompt: PromptBuilder,
}

impl RagPipeline {
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let prompt = PromptBuilder::new(config.preamble.clone());
        Self {
            config,
            embedder,
            index,
            llm,
            prompt,
        }
    }

    /// Build the production pipeline from application settings.
    ///
    /// The index is described once so the embedding dimension matches it; when
    /// that fails the configured default dimension is used instead.
    pub async fn from_app_config(app: &AppConfig) -> RagResult<Self> {
        let client = build_client(app.rag.upstream_timeout)
            .map_err(|e| RagError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let manager = IndexManager::new(client.clone(), &app.pinecone);
        let description = match manager.describe_index(&app.pinecone.index_name).await {
            Ok(Some(description)) => Some(description),
            Ok(None) => {
                warn!(index = %app.pinecone.index_name, "Vector index does not exist");
                None
            }
            Err(e) => {
                warn!(
                    index = %app.pinecone.index_name,
                    error = %e,
                    "Could not describe vector index, using default dimension"
                );
                None
            }
        };

        let dimension = description
            .as_ref()
            .map(|d| d.dimension)
            .unwrap_or(app.pinecone.default_dimension);

        let host = app
            .pinecone
            .index_host
            .clone()
            .or_else(|| description.map(|d| d.host).filter(|h| !h.is_empty()))
            .ok_or_else(|| {
                RagError::Config(format!(
                    "host for index {} is unknown; set PINECONE_INDEX_HOST",
                    app.pinecone.index_name
                ))
            })?;

        info!(
            index = %app.pinecone.index_name,
            host = %host,
            dimension = dimension,
            "Connected to vector index"
        );

        let embedder = OpenAiEmbedder::with_client(client.clone(), &app.openai, dimension);
        let index = PineconeIndex::new(client, &host, app.pinecone.api_key.clone());
        let llm = OpenAiChatClient::connect(&app.openai, app.rag.upstream_timeout).await?;

        let config = RagConfig {
            top_k: app.rag.top_k,
            ..RagConfig::default()
        };

        Ok(Self::new(
            config,
            Arc::new(embedder),
            Arc::new(index),
            Arc::new(llm),
        ))
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Answer a question from the indexed corpus
    pub async fn query(&self, question: &str) -> RagResult<AnswerResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("Question is required.".to_string()));
        }

        log_operation_start!("rag_query", top_k = self.config.top_k);
        let start_time = Instant::now();

        // Step 1: Embed the question
        let vector = self.embedder.embed_one(question).await?;

        // Step 2: Retrieve the closest chunks
        let retrieval_start = Instant::now();
        let matches = self.index.query(&vector, self.config.top_k).await?;
        let chunks = select_chunks(matches, self.config.top_k);

        info!(
            chunks = chunks.len(),
            duration_ms = retrieval_start.elapsed().as_millis() as u64,
            "Retrieved context chunks"
        );

        if chunks.is_empty() {
            warn!("No context retrieved, asking the model without it");
        }

        // Step 3: Generate the answer
        let prompt = self.prompt.build(question, &chunks);
        debug!(prompt_chars = prompt.len(), "Prompt assembled");

        let answer = self.llm.complete(&prompt).await?;

        log_operation_success!(
            "rag_query",
            chunks = chunks.len(),
            duration_ms = start_time.elapsed().as_millis() as u64
        );

        Ok(AnswerResponse {
            answer,
            sources: chunks.into_iter().map(|chunk| chunk.text).collect(),
        })
    }
}

/// Drop repeated texts, keeping the first occurrence, and cap at `top_k`
fn select_chunks(matches: Vec<RetrievedChunk>, top_k: usize) -> Vec<RetrievedChunk> {
    let mut seen = HashSet::new();
    matches
        .into_iter()
        .filter(|chunk| seen.insert(chunk.text.clone()))
        .take(top_k)
        .collect()
}
