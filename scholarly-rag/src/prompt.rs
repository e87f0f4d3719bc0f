//! Prompt assembly

use crate::types::RetrievedChunk;

/// Shown in place of the context when retrieval produced nothing
const EMPTY_CONTEXT: &str = "(no relevant context was found)";

/// Builds the single prompt sent to the LLM
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Join chunk texts in the order given, separated by blank lines
    pub fn context(chunks: &[RetrievedChunk]) -> String {
        chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn build(&self, question: &str, chunks: &[RetrievedChunk]) -> String {
        let context = if chunks.is_empty() {
            EMPTY_CONTEXT.to_string()
        } else {
            Self::context(chunks)
        };

        format!(
            "{}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
            self.preamble, context, question
        )
    }
}
