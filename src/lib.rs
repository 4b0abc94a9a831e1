//! # docchat: retrieval-augmented document chat pipeline
//!
//! docchat answers natural-language questions about a referenced document,
//! grounded in the most relevant excerpts of that document, while keeping
//! multi-turn conversational context. The crate covers the retrieval core:
//! fetch-or-reuse of document content, deterministic chunking, a TTL chunk
//! cache, BM25 context ranking, conversation persistence, and a pluggable
//! answer-synthesis capability.
//!
//! ```text
//! ChatRequest ──► ConversationManager::resolve ──► Conversation
//!                        │
//! DocumentCache::get_chunks ──► ingestion::extract ──► ingestion::chunk
//!        │        (miss only: fetch, strip markup, word-budget chunks)
//!        ▼
//! ranking::rank_chunks ──► top-K context chunks
//!        │
//! AnswerSynthesizer::synthesize (bounded, pluggable backend)
//!        │
//! ConversationManager::append_turn ──► ChatResponse
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use docchat::cache::DocumentCache;
//! use docchat::config::PipelineConfig;
//! use docchat::conversation::{ConversationManager, MemoryConversationStore};
//! use docchat::pipeline::{ChatPipeline, ChatRequest};
//! use docchat::synthesis::MockSynthesizer;
//!
//! # async fn run() -> Result<(), docchat::ChatError> {
//! let config = PipelineConfig::default();
//! let cache = Arc::new(DocumentCache::new(reqwest::Client::new(), &config));
//! let conversations = ConversationManager::new(Arc::new(MemoryConversationStore::new()));
//! let pipeline = ChatPipeline::new(
//!     cache,
//!     conversations,
//!     Arc::new(MockSynthesizer::new()),
//!     config,
//! );
//!
//! let response = pipeline
//!     .chat(ChatRequest::new(
//!         "https://example.com/handbook",
//!         "What does the handbook say about caching?",
//!     ))
//!     .await?;
//!
//! println!("{}", response.answer);
//! // Follow-up turns reuse the conversation id (and the cached chunks).
//! let followup = ChatRequest::new("https://example.com/handbook", "And the TTL?")
//!     .with_conversation_id(response.conversation_id);
//! # let _ = followup;
//! # Ok(())
//! # }
//! ```
//!
//! Long-lived resources (the HTTP client, the cache, the conversation
//! store pool) are constructed once at process start and shared by
//! reference; nothing in the crate keeps hidden global state.

pub mod cache;
pub mod config;
pub mod conversation;
pub mod ingestion;
pub mod message;
pub mod pipeline;
pub mod ranking;
pub mod synthesis;
pub mod types;

pub use cache::DocumentCache;
pub use config::PipelineConfig;
pub use conversation::{Conversation, ConversationManager, ConversationStore};
pub use ingestion::chunk::{Chunk, chunk_text};
pub use message::Message;
pub use pipeline::{ChatPipeline, ChatRequest, ChatResponse};
pub use ranking::rank_chunks;
pub use synthesis::{AnswerSynthesizer, MockSynthesizer};
pub use types::{ChatError, ErrorClass};
