use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::resilience::RetryConfig;

/// Default search endpoint of the remote lookup service.
pub const DEFAULT_API_URL: &str = "https://api.imdbapi.dev/search/titles";

/// Runtime configuration for the resolution engine.
///
/// The defaults are tuned for polite use of the public lookup service:
/// request spacing slightly over 100 ms keeps a single caller safely under
/// 10 req/s, and five workers bound the in-flight fan-out.
///
/// # Example
/// ```
/// use title_resolver::ResolverConfig;
/// use std::time::Duration;
///
/// let cfg = ResolverConfig::default()
///     .with_max_concurrent_requests(2)
///     .with_request_delay(Duration::from_millis(250));
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Search endpoint queried with a `query` parameter.
    pub api_url: String,
    /// Minimum spacing between outbound requests (per worker).
    #[serde(with = "crate::serde_millis")]
    pub request_delay: Duration,
    /// Number of workers draining the lookup queue.
    pub max_concurrent_requests: usize,
    /// Minimum similarity score for a candidate to count as a match.
    pub min_match_score: f64,
    /// Storage key under which the whole cache blob is persisted.
    pub storage_key: String,
    /// Age after which a cache entry is no longer trusted.
    #[serde(with = "crate::serde_millis")]
    pub cache_max_age: Duration,
    /// Overall per-request HTTP timeout.
    #[serde(with = "crate::serde_millis")]
    pub http_timeout: Duration,
    /// Retry behavior for transient remote failures.
    pub retry: RetryConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_delay: Duration::from_millis(110),
            max_concurrent_requests: 5,
            min_match_score: 0.7,
            storage_key: "title_rating_cache".into(),
            cache_max_age: Duration::from_secs(30 * 24 * 60 * 60),
            http_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl ResolverConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    pub fn with_min_match_score(mut self, score: f64) -> Self {
        self.min_match_score = score;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.api_url.trim().is_empty() {
            return Err(ResolveError::InvalidConfig(
                "api_url must not be empty".into(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ResolveError::InvalidConfig(
                "max_concurrent_requests must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_match_score) {
            return Err(ResolveError::InvalidConfig(
                "min_match_score must be within [0.0, 1.0]".into(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ResolveError::InvalidConfig(
                "storage_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
