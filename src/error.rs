use thiserror::Error;

/// Errors surfaced while constructing or configuring the engine.
///
/// Note that `Engine::resolve` itself never returns an error: every runtime
/// failure degrades to a `None` result for the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Configuration is inconsistent (e.g., zero workers or an empty endpoint).
    #[error("invalid resolver config: {0}")]
    InvalidConfig(String),
    /// The HTTP client for the remote lookup service could not be built.
    #[error("http client construction failed: {0}")]
    HttpClient(String),
}

/// Errors from a single call to the remote lookup service.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The service asked us to slow down.
    #[error("rate limited by remote service (HTTP {0})")]
    RateLimited(u16),
    /// Server-side failure, expected to clear up on its own.
    #[error("remote server error (HTTP {0})")]
    Server(u16),
    /// Any other non-success status. Not worth retrying.
    #[error("unexpected remote status (HTTP {0})")]
    Status(u16),
    /// The request never completed (DNS, connect, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The body arrived but did not decode into the expected shape.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// Whether a retry has a realistic chance of succeeding.
    ///
    /// Rate limiting and server errors are transient; everything else is
    /// terminal and degrades to a miss without further attempts.
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::RateLimited(_) | LookupError::Server(_))
    }
}

/// Failures from the persistent storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Backend-specific failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LookupError::RateLimited(429).is_transient());
        assert!(LookupError::Server(500).is_transient());
        assert!(LookupError::Server(503).is_transient());

        assert!(!LookupError::Status(404).is_transient());
        assert!(!LookupError::Status(400).is_transient());
        assert!(!LookupError::Transport("connection reset".into()).is_transient());
        assert!(!LookupError::InvalidResponse("not json".into()).is_transient());
    }

    #[test]
    fn lookup_error_display() {
        let err = LookupError::RateLimited(429);
        assert!(err.to_string().contains("429"));

        let err = LookupError::Status(404);
        assert!(err.to_string().contains("404"));

        let err = LookupError::Transport("timed out".into());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::InvalidConfig("zero workers".into());
        assert!(err.to_string().contains("invalid resolver config"));
        assert!(err.to_string().contains("zero workers"));
    }

    #[test]
    fn storage_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StorageError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn lookup_error_clone() {
        let err = LookupError::Server(502);
        let cloned = err.clone();
        assert_eq!(format!("{err}"), format!("{cloned}"));
    }
}
