//! Resilience for the outbound request path: spacing and retry with backoff.
//!
//! These keep the engine polite toward the remote lookup service and ride out
//! transient failures without ever surfacing them to callers.

mod rate_limit;
mod retry;

pub use rate_limit::{PacerStats, RequestPacer};
pub use retry::{execute_with_retry_async, RetryConfig, RetryResult};
