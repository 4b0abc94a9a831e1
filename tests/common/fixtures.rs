//! Shared fixtures for docchat integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use docchat::cache::DocumentCache;
use docchat::config::PipelineConfig;
use docchat::conversation::{ConversationManager, MemoryConversationStore};
use docchat::ingestion::chunk::Chunk;
use docchat::message::Message;
use docchat::pipeline::ChatPipeline;
use docchat::synthesis::{AnswerSynthesizer, MockSynthesizer};
use docchat::types::{ChatError, Result};

/// Install a fmt subscriber once so failing tests print pipeline traces.
/// Honors `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A document with three topically distinct sections, long enough to yield
/// several chunks at the default budget.
pub fn sample_document_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Service Handbook</title>
    <style>body { font-family: sans-serif; }</style>
    <script>window.analytics = "should never reach the extractor";</script>
</head>
<body>
    <h1>Service Handbook</h1>

    <h2>Caching</h2>
    <p>The document cache stores chunk sequences keyed by document reference.
    Every cached entry carries a time to live of twenty four hours, and an
    expired entry is refreshed by fetching and chunking the document again.
    Cache misses for the same reference are coalesced so only one fetch runs.</p>

    <h2>Ranking</h2>
    <p>Relevance ranking scores every chunk against the question using term
    frequency and inverse document frequency statistics over the chunk corpus.
    The three best scoring chunks are selected as context for the answer, with
    ties resolved by the original chunk order in the document.</p>

    <h2>Conversations</h2>
    <p>Each completed turn appends one user message and one assistant message
    to the conversation record. Conversations are created on the first turn
    and persisted after every completed turn, so follow up questions keep the
    full history available to the answer synthesizer.</p>
</body>
</html>"#
        .to_string()
}

/// Everything a pipeline test needs to drive requests and inspect state.
pub struct TestHarness {
    pub pipeline: ChatPipeline,
    pub cache: Arc<DocumentCache>,
    pub store: Arc<MemoryConversationStore>,
}

/// Build a pipeline over an in-memory store and the deterministic mock
/// synthesizer.
pub fn harness(config: PipelineConfig) -> TestHarness {
    harness_with_synthesizer(config, Arc::new(MockSynthesizer::new()))
}

/// Build a pipeline with a custom synthesis capability.
pub fn harness_with_synthesizer(
    config: PipelineConfig,
    synthesizer: Arc<dyn AnswerSynthesizer>,
) -> TestHarness {
    init_tracing();
    let cache = Arc::new(DocumentCache::new(reqwest::Client::new(), &config));
    let store = Arc::new(MemoryConversationStore::new());
    let pipeline = ChatPipeline::new(
        Arc::clone(&cache),
        ConversationManager::new(store.clone()),
        synthesizer,
        config,
    );
    TestHarness {
        pipeline,
        cache,
        store,
    }
}

/// Synthesizer that always fails, for no-partial-persistence tests.
#[derive(Clone, Debug, Default)]
pub struct FailingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for FailingSynthesizer {
    async fn synthesize(
        &self,
        _question: &str,
        _context: &[Chunk],
        _history: &[Message],
    ) -> Result<String> {
        Err(ChatError::Generation {
            reason: "backend unavailable".to_string(),
        })
    }
}

/// Synthesizer that sleeps past any reasonable bound, for timeout tests.
#[derive(Clone, Debug)]
pub struct SlowSynthesizer {
    pub delay: Duration,
}

#[async_trait]
impl AnswerSynthesizer for SlowSynthesizer {
    async fn synthesize(
        &self,
        _question: &str,
        context: &[Chunk],
        _history: &[Message],
    ) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("slow answer over {} chunks", context.len()))
    }
}
