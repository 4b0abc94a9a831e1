//! Pipeline configuration with code defaults and environment overrides.

use std::time::Duration;

/// Tuning knobs for the chat pipeline.
///
/// All fields have working defaults; construct with [`PipelineConfig::default`]
/// and override selectively with the `with_*` setters, or resolve overrides
/// from the environment with [`PipelineConfig::from_env`].
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum accumulated chunk size in word-boundary-weighted characters.
    pub max_chunk_size: usize,
    /// Number of ranked chunks handed to the synthesizer.
    pub top_k: usize,
    /// How long cached chunk sequences stay fresh.
    pub cache_ttl: Duration,
    /// Hard bound on the initial document request.
    pub request_timeout: Duration,
    /// Bounded grace period for the settle re-fetch. `None` disables the
    /// settle pass entirely.
    pub settle_timeout: Option<Duration>,
    /// Bound on a single answer-generation call.
    pub generation_timeout: Duration,
}

impl PipelineConfig {
    /// Default maximum chunk size (character-weighted units, not tokens).
    pub const DEFAULT_MAX_CHUNK_SIZE: usize = 500;
    /// Default number of context chunks selected per question.
    pub const DEFAULT_TOP_K: usize = 3;
    /// Default chunk-cache TTL: 24 hours.
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);
    /// Default bound on the initial document request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default bound on a generation call.
    pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

    /// Resolve a configuration from the environment, falling back to the
    /// code defaults for anything unset or unparseable.
    ///
    /// Recognized variables (a `.env` file is honored when present):
    /// `DOCCHAT_CHUNK_SIZE`, `DOCCHAT_TOP_K`, `DOCCHAT_CACHE_TTL_SECS`,
    /// `DOCCHAT_REQUEST_TIMEOUT_SECS`, `DOCCHAT_SETTLE_TIMEOUT_MS`,
    /// `DOCCHAT_GENERATION_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            max_chunk_size: env_parse("DOCCHAT_CHUNK_SIZE").unwrap_or(defaults.max_chunk_size),
            top_k: env_parse("DOCCHAT_TOP_K").unwrap_or(defaults.top_k),
            cache_ttl: env_parse("DOCCHAT_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            request_timeout: env_parse("DOCCHAT_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            settle_timeout: env_parse("DOCCHAT_SETTLE_TIMEOUT_MS").map(Duration::from_millis),
            generation_timeout: env_parse("DOCCHAT_GENERATION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
        }
    }

    #[must_use]
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub fn with_settle_timeout(mut self, settle_timeout: Option<Duration>) -> Self {
        self.settle_timeout = settle_timeout;
        self
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, generation_timeout: Duration) -> Self {
        self.generation_timeout = generation_timeout;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: Self::DEFAULT_MAX_CHUNK_SIZE,
            top_k: Self::DEFAULT_TOP_K,
            cache_ttl: Self::DEFAULT_CACHE_TTL,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            settle_timeout: None,
            generation_timeout: Self::DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}
