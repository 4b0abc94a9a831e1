//! Answer synthesis capability boundary.
//!
//! The pipeline treats answer generation as a black box: ordered context
//! chunks, the full prior message history, and the new question go in; a
//! single answer string comes out. Adapters for real text-generation
//! backends implement [`AnswerSynthesizer`]; the core never assumes any
//! vendor's request or response shape, and retry/backoff policy belongs to
//! the adapter, not here.

use async_trait::async_trait;

use crate::ingestion::chunk::Chunk;
use crate::message::Message;
use crate::types::Result;

/// Capability contract for turning ranked context into an answer.
///
/// Failures surface as [`ChatError::Generation`](crate::ChatError::Generation);
/// the pipeline never fabricates a fallback answer.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Produce an answer to `question` grounded in `context`, given the
    /// conversation `history` so far.
    async fn synthesize(
        &self,
        question: &str,
        context: &[Chunk],
        history: &[Message],
    ) -> Result<String>;
}

/// Assemble the fixed prompt shape shared by synthesis adapters: the
/// ranked context chunks as a block, then the question.
#[must_use]
pub fn build_prompt(question: &str, context: &[Chunk]) -> String {
    let context_block = context
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Context:\n{context_block}\n\nQuestion: {question}\n\nAnswer:")
}

/// Deterministic synthesizer for tests and backend-less deployments.
///
/// Echoes the question and the amount of context it received, so pipeline
/// behavior stays assertable without a live generation backend.
#[derive(Clone, Debug, Default)]
pub struct MockSynthesizer;

impl MockSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnswerSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        question: &str,
        context: &[Chunk],
        _history: &[Message],
    ) -> Result<String> {
        Ok(format!(
            "Based on the document, here is the answer to '{question}'. (Context from {} chunks)",
            context.len()
        ))
    }
}
