//! Word-budget text chunker.
//!
//! Splits normalized document text into bounded, order-preserving [`Chunk`]s.
//! Chunking is a pure function of its inputs: the same text and budget always
//! produce the same chunk sequence, which is what makes cached chunk
//! sequences safe to reuse across requests.
//!
//! # Algorithm
//!
//! 1. Tokenize the text into whitespace-delimited words.
//! 2. Greedily accumulate words into the current chunk, counting
//!    `word.len() + 1` per word (one separator each).
//! 3. When the running size reaches `max_chunk_size`, close the chunk and
//!    start a new one.
//! 4. Flush any trailing partial chunk.
//!
//! A single word longer than the budget still forms its own chunk; words are
//! never split. Empty input yields an empty sequence.

use serde::{Deserialize, Serialize};

/// An ordered, zero-indexed segment of extracted document text.
///
/// Chunks are the unit of retrieval: the cache stores them, the ranker
/// scores them, and the synthesizer receives the top-ranked few as context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position of this chunk within the source document.
    pub index: usize,
    /// The chunk text, single-space separated.
    pub content: String,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }
}

/// Split `text` into chunks of at most `max_chunk_size` accumulated
/// word-weighted characters.
///
/// The final chunk may be shorter; any chunk may overshoot the budget by at
/// most the length of its last word (the word that crossed the threshold is
/// kept rather than split).
#[must_use]
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0usize;

    for word in text.split_whitespace() {
        current.push(word);
        current_size += word.len() + 1;
        if current_size >= max_chunk_size {
            chunks.push(Chunk::new(chunks.len(), current.join(" ")));
            current.clear();
            current_size = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(chunks.len(), current.join(" ")));
    }

    chunks
}
