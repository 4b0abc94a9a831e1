//! Ingestion utilities for turning a referenced document into ranked-ready chunks.
//!
//! Two capabilities live here:
//!
//! * [`extract`] — bounded fetching plus markup stripping and whitespace
//!   normalization.
//! * [`chunk`] — deterministic word-budget chunking of the extracted text.

pub mod chunk;
pub mod extract;

pub use chunk::{Chunk, chunk_text};
pub use extract::{FetchPolicy, extract_text, fetch_document, parse_reference};
