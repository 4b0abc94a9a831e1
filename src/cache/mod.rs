//! Process-wide TTL cache for per-document chunk sequences.
//!
//! The cache amortizes fetch + extract + chunk work across requests: the
//! first request for a document reference pays the full ingestion cost, and
//! every request within the TTL reuses the stored chunk sequence. Entries
//! are replaced wholesale on refresh, never mutated in place, so readers
//! always observe a complete chunk sequence.
//!
//! Concurrent misses for the same reference are coalesced: one request runs
//! the ingestion while the rest wait on a per-reference gate and then read
//! the freshly populated entry. A failed ingestion leaves the cache
//! untouched (no negative entries) and releases the gate so the next
//! request can try again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use reqwest::Client;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::PipelineConfig;
use crate::ingestion::chunk::{Chunk, chunk_text};
use crate::ingestion::extract::{self, FetchPolicy};
use crate::types::Result;

/// Fixed prefix for cache keys; the full key is the prefix plus the
/// document reference.
pub const CACHE_KEY_PREFIX: &str = "doc_chunks:";

/// Compute the cache key for a document reference.
#[must_use]
pub fn cache_key(reference: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{reference}")
}

struct CacheEntry {
    chunks: Arc<Vec<Chunk>>,
    inserted_at: Instant,
}

/// Shared, read-mostly chunk cache keyed by document reference.
///
/// Holds the long-lived HTTP client and the chunking budget, so a cache
/// miss can run the entire extract-then-chunk path itself. Construct once
/// per process and share behind an `Arc`.
pub struct DocumentCache {
    client: Client,
    policy: FetchPolicy,
    max_chunk_size: usize,
    ttl: Duration,
    entries: RwLock<FxHashMap<String, CacheEntry>>,
    inflight: Mutex<FxHashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentCache {
    /// Create a cache that fetches with `client` under the bounds and
    /// budgets of `config`.
    #[must_use]
    pub fn new(client: Client, config: &PipelineConfig) -> Self {
        Self {
            client,
            policy: FetchPolicy {
                request_timeout: config.request_timeout,
                settle_timeout: config.settle_timeout,
            },
            max_chunk_size: config.max_chunk_size,
            ttl: config.cache_ttl,
            entries: RwLock::new(FxHashMap::default()),
            inflight: Mutex::new(FxHashMap::default()),
        }
    }

    /// Return the chunk sequence for `reference`, ingesting it on a miss.
    ///
    /// A hit (entry present and unexpired) performs no extractor or chunker
    /// work. A miss or expired entry runs fetch → extract → chunk and
    /// stores the result under the cache TTL. Ingestion failures propagate
    /// and do not populate the cache.
    #[instrument(skip(self))]
    pub async fn get_chunks(&self, reference: &str) -> Result<Arc<Vec<Chunk>>> {
        let url = extract::parse_reference(reference)?;
        let key = cache_key(reference);

        if let Some(chunks) = self.fresh(&key) {
            debug!(reference, "cache hit");
            return Ok(chunks);
        }

        // Serialize concurrent misses per reference. Whoever acquires the
        // gate first ingests; the rest re-check and reuse the fresh entry.
        let gate = {
            let mut inflight = self.inflight.lock();
            Arc::clone(
                inflight
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let _permit = gate.lock().await;

        if let Some(chunks) = self.fresh(&key) {
            debug!(reference, "cache hit after coalesced miss");
            return Ok(chunks);
        }

        info!(reference, "cache miss, fetching and chunking");
        let outcome = self.populate(&url, &key).await;

        self.inflight.lock().remove(&key);
        outcome
    }

    /// True when an unexpired entry exists for `reference`.
    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.fresh(&cache_key(reference)).is_some()
    }

    fn fresh(&self, key: &str) -> Option<Arc<Vec<Chunk>>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.chunks))
    }

    async fn populate(&self, url: &Url, key: &str) -> Result<Arc<Vec<Chunk>>> {
        let text = extract::extract(&self.client, url, &self.policy).await?;
        let chunks = Arc::new(chunk_text(&text, self.max_chunk_size));

        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            CacheEntry {
                chunks: Arc::clone(&chunks),
                inserted_at: Instant::now(),
            },
        );
        debug!(key, chunk_count = chunks.len(), "cache entry stored");
        Ok(chunks)
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("ttl", &self.ttl)
            .field("max_chunk_size", &self.max_chunk_size)
            .finish()
    }
}
