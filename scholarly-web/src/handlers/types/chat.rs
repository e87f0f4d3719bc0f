//! Chatbot request and response types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chatbot question
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ChatbotRequest {
    #[serde(default)]
    #[schema(example = "What is the main topic of the research?")]
    pub question: Option<String>,
}

/// Chatbot answer with the passages it was grounded on
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatbotResponse {
    #[schema(example = "The research focuses on coral reef ecology.")]
    pub answer: String,
    /// Retrieved passages, most similar first
    pub sources: Vec<String>,
}

impl From<scholarly_rag::AnswerResponse> for ChatbotResponse {
    fn from(response: scholarly_rag::AnswerResponse) -> Self {
        Self {
            answer: response.answer,
            sources: response.sources,
        }
    }
}
