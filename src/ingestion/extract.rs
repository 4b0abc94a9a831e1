//! Document fetching and plain-text extraction.
//!
//! Fetching is bounded in two tiers: the initial request carries a hard
//! timeout (failure is a [`ChatError::Fetch`]), while the optional *settle
//! pass*, a single bounded re-fetch that picks up late-rendered auxiliary
//! content, degrades instead of failing. When the settle pass errors or
//! times out, the extractor logs the degrade and continues with the body it
//! already has.
//!
//! Extraction strips non-content markup (`script`, `style`, `noscript`,
//! `head`), trims every line, collapses blank separators, and joins the
//! surviving segments with newlines.

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Node};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::types::{ChatError, Result};

/// Bounds applied while fetching a document.
#[derive(Clone, Debug)]
pub struct FetchPolicy {
    /// Hard bound on the initial document request.
    pub request_timeout: Duration,
    /// Bounded grace period for the settle re-fetch. `None` skips the pass.
    pub settle_timeout: Option<Duration>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            settle_timeout: None,
        }
    }
}

/// Parse and validate a document reference.
///
/// References must be absolute http(s) URLs; anything else is a
/// [`ChatError::InvalidReference`] (a caller mistake, not an internal
/// failure).
pub fn parse_reference(reference: &str) -> Result<Url> {
    let url = Url::parse(reference).map_err(|err| ChatError::InvalidReference {
        reference: reference.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatError::InvalidReference {
            reference: reference.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

/// Fetch the raw document body behind `url`.
///
/// The initial request is mandatory and its failure propagates. The settle
/// pass, when enabled, prefers the newer body only when it is at least as
/// large as the first one, so a flaky re-fetch can never lose content.
#[instrument(skip(client, policy), fields(url = %url))]
pub async fn fetch_document(client: &Client, url: &Url, policy: &FetchPolicy) -> Result<String> {
    let first = fetch_once(client, url, policy.request_timeout).await?;

    let Some(settle) = policy.settle_timeout else {
        return Ok(first);
    };

    match fetch_once(client, url, settle).await {
        Ok(second) if second.len() >= first.len() => {
            debug!(bytes = second.len(), "settle pass refreshed document body");
            Ok(second)
        }
        Ok(_) => {
            debug!("settle pass returned a smaller body, keeping initial fetch");
            Ok(first)
        }
        Err(err) => {
            warn!(error = %err, "settle pass degraded, continuing with initial fetch");
            Ok(first)
        }
    }
}

async fn fetch_once(client: &Client, url: &Url, bound: Duration) -> Result<String> {
    let request = async {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| fetch_error(url, &err))?
            .error_for_status()
            .map_err(|err| fetch_error(url, &err))?;
        response.text().await.map_err(|err| fetch_error(url, &err))
    };

    match tokio::time::timeout(bound, request).await {
        Ok(result) => result,
        Err(_) => Err(ChatError::Fetch {
            url: url.to_string(),
            reason: format!("request exceeded {}ms bound", bound.as_millis()),
        }),
    }
}

fn fetch_error(url: &Url, err: &reqwest::Error) -> ChatError {
    ChatError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

/// Reduce an HTML document to clean, whitespace-normalized plain text.
///
/// Text inside `script`, `style`, `noscript`, and `head` is dropped; the
/// remaining text nodes are collected in document order.
#[must_use]
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.root_element().descendants() {
        if let Node::Text(text) = node.value() {
            let skipped = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(element) => {
                    matches!(element.name(), "script" | "style" | "noscript" | "head")
                }
                _ => false,
            });
            if skipped {
                continue;
            }
            raw.push_str(text);
            raw.push('\n');
        }
    }

    normalize_whitespace(&raw)
}

/// Fetch `url` and extract its text.
///
/// Yields [`ChatError::EmptyContent`] when markup stripping leaves nothing;
/// callers treat the document as unusable rather than caching an empty
/// chunk sequence.
#[instrument(skip(client, policy), fields(url = %url))]
pub async fn extract(client: &Client, url: &Url, policy: &FetchPolicy) -> Result<String> {
    let html = fetch_document(client, url, policy).await?;
    let text = extract_text(&html);
    if text.is_empty() {
        return Err(ChatError::EmptyContent {
            url: url.to_string(),
        });
    }
    Ok(text)
}

/// Trim every line, split on runs of doubled spaces, drop blank segments,
/// and join with newlines.
fn normalize_whitespace(text: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for line in text.lines() {
        for phrase in line.trim().split("  ") {
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                segments.push(phrase);
            }
        }
    }
    segments.join("\n")
}
