//! Request orchestration for the document chat pipeline.
//!
//! Each request runs the same sequential stage machine:
//!
//! ```text
//! resolve conversation → fetch chunks → rank → generate → persist → respond
//! ```
//!
//! Any stage failure aborts the request without partial persistence: a
//! user-only turn is never written, and a bad conversation id fails before
//! any document work starts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cache::DocumentCache;
use crate::config::PipelineConfig;
use crate::conversation::ConversationManager;
use crate::ranking::rank_chunks;
use crate::synthesis::AnswerSynthesizer;
use crate::types::{ChatError, Result};

/// A single chat turn request.
///
/// Unknown fields are rejected at deserialization; loosely typed payloads
/// stop at this boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChatRequest {
    /// The document the question is about; also the cache key.
    pub document_url: String,
    /// The user's question for this turn.
    pub question: String,
    /// Continue an existing conversation; omit to start a fresh one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Build a first-turn request (no conversation id).
    #[must_use]
    pub fn new(document_url: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            document_url: document_url.into(),
            question: question.into(),
            conversation_id: None,
        }
    }

    /// Continue the given conversation.
    #[must_use]
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// The completed turn: the answer, the context chunks it was grounded in
/// (echoed for traceability), and the conversation id for follow-ups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChatResponse {
    pub answer: String,
    pub source_chunks: Vec<String>,
    pub conversation_id: String,
}

/// The assembled pipeline. Holds the long-lived collaborators (cache,
/// conversation manager, synthesis capability) and runs one stage machine
/// per [`chat`](ChatPipeline::chat) call.
pub struct ChatPipeline {
    cache: Arc<DocumentCache>,
    conversations: ConversationManager,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    config: PipelineConfig,
}

impl ChatPipeline {
    #[must_use]
    pub fn new(
        cache: Arc<DocumentCache>,
        conversations: ConversationManager,
        synthesizer: Arc<dyn AnswerSynthesizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            cache,
            conversations,
            synthesizer,
            config,
        }
    }

    /// Run one chat turn end to end.
    #[instrument(skip(self, request), fields(document_url = %request.document_url))]
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        // Resolve first: an unknown conversation id aborts before any
        // fetching or chunking work.
        let conversation = self
            .conversations
            .resolve(request.conversation_id.as_deref(), &request.document_url)
            .await?;

        let chunks = self.cache.get_chunks(&request.document_url).await?;

        let ranked = rank_chunks(&request.question, &chunks, self.config.top_k);
        debug!(
            selected = ranked.len(),
            corpus = chunks.len(),
            "ranked context chunks"
        );

        let generation = self
            .synthesizer
            .synthesize(&request.question, &ranked, &conversation.messages);
        let answer = match tokio::time::timeout(self.config.generation_timeout, generation).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ChatError::Generation {
                    reason: format!(
                        "synthesis exceeded {}ms bound",
                        self.config.generation_timeout.as_millis()
                    ),
                });
            }
        };

        // Persist only the completed user/assistant pair.
        let conversation = self
            .conversations
            .append_turn(conversation, &request.question, &answer)
            .await?;

        Ok(ChatResponse {
            answer,
            source_chunks: ranked.into_iter().map(|chunk| chunk.content).collect(),
            conversation_id: conversation.id,
        })
    }
}

impl std::fmt::Debug for ChatPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatPipeline")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let request = ChatRequest::new("https://example.com/doc", "What is X?")
            .with_conversation_id("conv-1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["documentUrl"], "https://example.com/doc");
        assert_eq!(json["question"], "What is X?");
        assert_eq!(json["conversationId"], "conv-1");
    }

    #[test]
    fn request_conversation_id_is_optional() {
        let parsed: ChatRequest = serde_json::from_str(
            r#"{"documentUrl": "https://example.com/doc", "question": "What is X?"}"#,
        )
        .unwrap();
        assert!(parsed.conversation_id.is_none());
    }

    #[test]
    fn unknown_request_fields_are_rejected() {
        let result: std::result::Result<ChatRequest, _> = serde_json::from_str(
            r#"{"documentUrl": "https://example.com/doc", "question": "?", "extra": true}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn response_round_trips() {
        let response = ChatResponse {
            answer: "An answer.".to_string(),
            source_chunks: vec!["chunk one".to_string()],
            conversation_id: "conv-1".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("sourceChunks"));
        let parsed: ChatResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
