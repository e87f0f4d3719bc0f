//! Scholarly RAG - Retrieval-Augmented Generation over the research corpus
//!
//! Answers visitor questions from passages stored in a managed vector index,
//! and provides the chunking and ingestion tooling that fills that index.

pub mod chunking;
pub mod embeddings;
pub mod http;
pub mod indexing;
pub mod llm_client;
pub mod prompt;
pub mod rag_pipeline;
pub mod retriever;
pub mod storage;
pub mod types;

pub use chunking::{chunk_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use embeddings::{Embedder, OpenAiEmbedder};
pub use indexing::{IngestProgress, IngestStats, Ingestor};
pub use llm_client::{LlmClient, OpenAiChatClient};
pub use prompt::PromptBuilder;
pub use rag_pipeline::RagPipeline;
pub use retriever::{PineconeIndex, VectorIndex};
pub use storage::IndexManager;
pub use types::{
    AnswerResponse, IndexDescription, RagConfig, RagError, RagResult, RetrievedChunk, TextChunk,
    VectorRecord,
};
