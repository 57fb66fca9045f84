//! Remote lookup service boundary.
//!
//! The engine only needs one operation from the remote side: search the
//! catalog for a free-text query and hand back raw candidates. That operation
//! is a trait so tests and alternative transports can stand in for the real
//! HTTP service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{LookupError, ResolveError};
use crate::types::CandidateTitle;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote catalog search.
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Search for `query`, returning the raw candidate list. An empty list is
    /// a valid (terminal) outcome, not an error.
    async fn search_titles(&self, query: &str) -> Result<Vec<CandidateTitle>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    titles: Vec<CandidateTitle>,
}

/// Production implementation: `GET {endpoint}?query={title}` with a pooled
/// client.
pub struct HttpLookupService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLookupService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ResolveError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl LookupService for HttpLookupService {
    async fn search_titles(&self, query: &str) -> Result<Vec<CandidateTitle>, LookupError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        debug!(query, candidates = body.titles.len(), "search_completed");
        Ok(body.titles)
    }
}

/// Map a non-success HTTP status onto the error taxonomy: 429 and the 5xx
/// class are transient, everything else terminal.
fn classify_status(status: u16) -> LookupError {
    match status {
        429 => LookupError::RateLimited(status),
        500..=599 => LookupError::Server(status),
        _ => LookupError::Status(status),
    }
}
