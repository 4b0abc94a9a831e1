//! Lexical relevance ranking over a chunk corpus.
//!
//! Scores chunks against a query with BM25 over whitespace tokens. No
//! stemming or stopword removal is applied, so rankings stay reproducible
//! across runs and environments.
//!
//! # Scoring
//!
//! For each query term `t` and chunk `d`:
//!
//! ```text
//! idf(t)      = ln(((N - df(t) + 0.5) / (df(t) + 0.5)) + 1)
//! score(t, d) = idf(t) * tf(t, d) * (k1 + 1)
//!               / (tf(t, d) + k1 * (1 - b + b * |d| / avgdl))
//! ```
//!
//! with the conventional `k1 = 1.5`, `b = 0.75`. The `+ 1` inside the
//! logarithm keeps idf positive for terms present in most of the corpus.
//! Results are ordered by descending score with ties broken by original
//! chunk order.

use rustc_hash::FxHashMap;

use crate::ingestion::chunk::Chunk;

const BM25_K1: f64 = 1.5;
const BM25_B: f64 = 0.75;

/// Term statistics for a fixed chunk corpus.
///
/// Fitting tokenizes every chunk once; scoring is then a lookup per query
/// term. The model borrows nothing from the corpus and is request-scoped.
#[derive(Debug)]
pub struct Bm25Model {
    term_frequencies: Vec<FxHashMap<String, usize>>,
    doc_lengths: Vec<f64>,
    avg_doc_length: f64,
    doc_frequencies: FxHashMap<String, usize>,
    corpus_size: usize,
}

impl Bm25Model {
    /// Build corpus statistics over `chunks`.
    ///
    /// Callers short-circuit the empty corpus before fitting; an empty
    /// model would produce degenerate statistics (`avgdl = 0`).
    #[must_use]
    pub fn fit(chunks: &[Chunk]) -> Self {
        let mut term_frequencies = Vec::with_capacity(chunks.len());
        let mut doc_lengths = Vec::with_capacity(chunks.len());
        let mut doc_frequencies: FxHashMap<String, usize> = FxHashMap::default();

        for chunk in chunks {
            let mut frequencies: FxHashMap<String, usize> = FxHashMap::default();
            let mut length = 0usize;
            for token in chunk.content.split_whitespace() {
                *frequencies.entry(token.to_string()).or_insert(0) += 1;
                length += 1;
            }
            for term in frequencies.keys() {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
            term_frequencies.push(frequencies);
            doc_lengths.push(length as f64);
        }

        let total_length: f64 = doc_lengths.iter().sum();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total_length / doc_lengths.len() as f64
        };

        Self {
            term_frequencies,
            doc_lengths,
            avg_doc_length,
            doc_frequencies,
            corpus_size: chunks.len(),
        }
    }

    /// BM25 score of the chunk at `index` against `query_terms`.
    #[must_use]
    pub fn score(&self, query_terms: &[&str], index: usize) -> f64 {
        let frequencies = &self.term_frequencies[index];
        // A corpus of empty chunks has avgdl = 0; fall back to neutral
        // length normalization instead of dividing by zero.
        let length_norm = if self.avg_doc_length > 0.0 {
            1.0 - BM25_B + BM25_B * self.doc_lengths[index] / self.avg_doc_length
        } else {
            1.0
        };

        query_terms
            .iter()
            .map(|term| {
                let tf = frequencies.get(*term).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                self.idf(term) * tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * length_norm)
            })
            .sum()
    }

    fn idf(&self, term: &str) -> f64 {
        let df = self.doc_frequencies.get(term).copied().unwrap_or(0) as f64;
        let n = self.corpus_size as f64;
        (((n - df + 0.5) / (df + 0.5)) + 1.0).ln()
    }
}

/// Select the `top_k` most relevant chunks for `query`.
///
/// Returns at most `min(top_k, chunks.len())` chunks, best first, ties in
/// original chunk order. An empty corpus yields an empty ranking without
/// fitting the model.
#[must_use]
pub fn rank_chunks(query: &str, chunks: &[Chunk], top_k: usize) -> Vec<Chunk> {
    if chunks.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let model = Bm25Model::fit(chunks);
    let query_terms: Vec<&str> = query.split_whitespace().collect();

    let mut scored: Vec<(f64, &Chunk)> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| (model.score(&query_terms, index), chunk))
        .collect();

    // Stable sort: equal scores keep original chunk order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(top_k)
        .map(|(_, chunk)| chunk.clone())
        .collect()
}
