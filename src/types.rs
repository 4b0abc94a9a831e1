//! Shared error taxonomy for the document chat pipeline.
//!
//! Every fallible seam in the crate surfaces a [`ChatError`] variant. The
//! variants map one-to-one onto the failure modes of the pipeline stages:
//! reference validation, document fetch, text extraction, conversation
//! lookup, persistence, and answer generation.
//!
//! Transport layers that sit above the pipeline should not match on
//! individual variants to pick a status code; [`ChatError::class`] already
//! separates caller mistakes ([`ErrorClass::Client`]) from internal
//! failures ([`ErrorClass::Internal`]).

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type for pipeline operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ChatError {
    #[error("invalid document reference {reference:?}: {reason}")]
    #[diagnostic(
        code(docchat::invalid_reference),
        help("Document references must be absolute http(s) URLs.")
    )]
    InvalidReference { reference: String, reason: String },

    #[error("failed to fetch document {url}: {reason}")]
    #[diagnostic(
        code(docchat::fetch),
        help("Check that the document URL is reachable and returns a success status.")
    )]
    Fetch { url: String, reason: String },

    #[error("document {url} produced no extractable text")]
    #[diagnostic(
        code(docchat::empty_content),
        help("The page rendered no text content after markup stripping.")
    )]
    EmptyContent { url: String },

    #[error("conversation {id} not found")]
    #[diagnostic(
        code(docchat::conversation_not_found),
        help("Omit the conversation id to start a fresh conversation.")
    )]
    NotFound { id: String },

    #[error("conversation persistence failed: {reason}")]
    #[diagnostic(
        code(docchat::persistence),
        help("The conversation store rejected the write; do not blindly retry updates of deleted records.")
    )]
    Persistence { reason: String },

    #[error("answer generation failed: {reason}")]
    #[diagnostic(
        code(docchat::generation),
        help("The synthesis capability failed or timed out; no conversation state was committed.")
    )]
    Generation { reason: String },
}

/// Coarse classification of a [`ChatError`] for transport mapping.
///
/// `Client` errors are the "your reference was invalid" family (404-class);
/// `Internal` errors are everything the caller cannot fix by changing the
/// request (500-class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Internal,
}

impl ChatError {
    /// Classify this error for transport-level status mapping.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            ChatError::InvalidReference { .. } | ChatError::NotFound { .. } => ErrorClass::Client,
            ChatError::Fetch { .. }
            | ChatError::EmptyContent { .. }
            | ChatError::Persistence { .. }
            | ChatError::Generation { .. } => ErrorClass::Internal,
        }
    }

    /// True when the error is attributable to the caller's request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Client
    }
}
