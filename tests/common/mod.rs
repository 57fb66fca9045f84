//! Shared fixtures for the integration suites: a scriptable lookup service,
//! a failing storage backend, and candidate builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use title_resolver::{
    AggregateRating, CandidateTitle, LookupError, LookupService, ResolverConfig, RetryConfig,
    StorageBackend, StorageError,
};

/// Lookup service double. Counts calls, optionally sleeps to widen race
/// windows, plays back a script of responses, then repeats a fallback.
pub struct MockLookup {
    calls: AtomicUsize,
    delay: Duration,
    script: Mutex<VecDeque<Result<Vec<CandidateTitle>, LookupError>>>,
    fallback: Result<Vec<CandidateTitle>, LookupError>,
}

impl MockLookup {
    pub fn returning(candidates: Vec<CandidateTitle>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(candidates),
        }
    }

    pub fn failing(error: LookupError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            fallback: Err(error),
        }
    }

    /// Responses consumed in order before the fallback kicks in.
    pub fn with_script(self, script: Vec<Result<Vec<CandidateTitle>, LookupError>>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupService for MockLookup {
    async fn search_titles(&self, _query: &str) -> Result<Vec<CandidateTitle>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Storage backend whose every operation fails; the engine must keep working
/// in memory regardless.
pub struct FailingStorage;

#[async_trait]
impl StorageBackend for FailingStorage {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::Backend("storage offline".into()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
        Err(StorageError::Backend("storage offline".into()))
    }
}

pub fn candidate(id: &str, title: &str, category: &str, year: u32) -> CandidateTitle {
    CandidateTitle {
        id: id.into(),
        primary_title: Some(title.into()),
        original_title: None,
        title_type: Some(category.into()),
        start_year: Some(year),
        rating: Some(AggregateRating {
            aggregate_rating: Some(8.8),
            vote_count: Some(2_300_000),
        }),
    }
}

pub fn inception_candidates() -> Vec<CandidateTitle> {
    vec![candidate("tt1375666", "Inception", "movie", 2010)]
}

/// Config with timings shrunk so suites run in milliseconds.
pub fn fast_config() -> ResolverConfig {
    ResolverConfig::default()
        .with_request_delay(Duration::from_millis(2))
        .with_retry(
            RetryConfig::default()
                .with_max_retries(2)
                .with_base_delay(Duration::from_millis(25)),
        )
}
