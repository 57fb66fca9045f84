//! Title Resolution Engine
//!
//! This crate turns free-text titles (the noisy strings you scrape off a
//! page) into canonical rating records from a remote lookup service, without
//! hammering that service and without asking it the same question twice.
//!
//! What you get:
//!
//! - **Durable caching** - Results persist across restarts through a
//!   pluggable storage backend, with a 30-day TTL and a schema-version guard
//!   that wipes the cache when the format changes.
//! - **Polite outbound traffic** - A bounded worker pool drains one FIFO
//!   queue, every request gates on a shared pacer, and transient failures
//!   (rate limiting, server errors) retry with exponential backoff.
//! - **In-flight dedup** - Concurrent lookups for the same `(title,
//!   category)` share a single outbound request.
//! - **Fuzzy matching** - Scraped titles are rarely exact. Candidates are
//!   scored with a blend of edit distance, Jaro, common-substring, and
//!   word-overlap measures, and only confident matches are kept.
//!
//! Callers never see an error from [`Engine::resolve`]: every failure mode —
//! exhausted retries, malformed responses, storage trouble, low-confidence
//! matches — degrades to `None`. Re-ask later and the engine tries again.
//!
//! ## Quick example
//!
//! ```no_run
//! use std::sync::Arc;
//! use title_resolver::{Engine, FileStorage, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(FileStorage::new("./cache"));
//!     let engine = Engine::with_http(ResolverConfig::default(), storage)
//!         .await
//!         .expect("engine construction");
//!
//!     if let Some(record) = engine.resolve("The Offfice", Some("tvSeries")).await {
//!         println!("{} ({}) rated {}", record.title, record.votes, record.score);
//!     }
//! }
//! ```
//!
//! The library installs no tracing subscriber; wire up your own to see the
//! structured `resolve_*` / `lookup_*` / `cache_*` events.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod resilience;
pub mod similarity;
pub mod storage;
pub mod types;

mod serde_millis;

pub use crate::api::{HttpLookupService, LookupService};
pub use crate::cache::{CacheEntry, RatingCache, CACHE_SCHEMA_VERSION};
pub use crate::config::{ResolverConfig, DEFAULT_API_URL};
pub use crate::engine::Engine;
pub use crate::error::{LookupError, ResolveError, StorageError};
pub use crate::matcher::{find_best_match, BestMatch};
pub use crate::resilience::{PacerStats, RequestPacer, RetryConfig};
pub use crate::similarity::{normalize_title, similarity};
pub use crate::storage::{FileStorage, MemoryStorage, StorageBackend};
pub use crate::types::{
    format_votes, AggregateRating, CandidateTitle, LookupKey, RatingRecord, RatingScore,
};
