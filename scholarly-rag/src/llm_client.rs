//! LLM client integration using siumai
//!
//! Sends the assembled prompt to an OpenAI-compatible chat model.

use crate::types::{RagError, RagResult};
use async_trait::async_trait;
use scholarly_core::{normalize_model_name, with_timeout, OpenAiSettings};
use siumai::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Generates a completion for a single prompt
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> RagResult<String>;

    fn model(&self) -> &str;
}

/// Chat completions client backed by siumai's OpenAI provider
pub struct OpenAiChatClient {
    client: Box<dyn siumai::prelude::LlmClient>,
    model: String,
    timeout: Duration,
}

impl OpenAiChatClient {
    /// Build the provider client. `timeout` bounds every completion call.
    pub async fn connect(settings: &OpenAiSettings, timeout: Duration) -> RagResult<Self> {
        let model = normalize_model_name(&settings.llm_model);
        let base_url = settings.base_url.trim_end_matches('/');

        let client = LlmBuilder::new()
            .openai()
            .api_key(settings.api_key.expose())
            .model(&model)
            .base_url(base_url)
            .build()
            .await
            .map_err(|e| RagError::Llm(format!("Failed to build OpenAI client: {}", e)))?;

        info!(model = %model, endpoint = %base_url, "Created LLM client");

        Ok(Self {
            client: Box::new(client),
            model,
            timeout,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> RagResult<String> {
        let start_time = Instant::now();
        let messages = vec![user!(prompt)];

        let response = with_timeout(self.client.chat(messages), self.timeout, "openai_chat")
            .await
            .map_err(|_| RagError::Llm("OpenAI chat request timed out".to_string()))?
            .map_err(|e| RagError::Llm(format!("OpenAI chat request failed: {}", e)))?;

        let answer = response
            .content_text()
            .map(str::to_string)
            .ok_or_else(|| RagError::Llm("OpenAI chat returned no message content".to_string()))?;

        debug!(
            model = %self.model,
            duration_ms = start_time.elapsed().as_millis() as u64,
            answer_chars = answer.len(),
            "LLM completion received"
        );

        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
