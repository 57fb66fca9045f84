//! Request coordination: cache dedup, queueing, worker pool, write-through.
//!
//! The [`Engine`] is the single owned instance tying everything together. A
//! resolve call either answers from the cache, attaches to an identical
//! in-flight lookup, or enqueues new work for a bounded pool of workers. Each
//! worker pulls FIFO, gates on the pacer, performs the remote call with
//! retry, picks the best candidate, and writes a confident match through the
//! cache before completing every waiter attached to that key.
//!
//! Callers never see an error: every failure mode degrades to `None`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::api::{HttpLookupService, LookupService};
use crate::cache::{CacheEntry, RatingCache};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::matcher::find_best_match;
use crate::resilience::{execute_with_retry_async, PacerStats, RequestPacer};
use crate::storage::StorageBackend;
use crate::types::{LookupKey, RatingRecord};

/// Queued unit of work. Completion handles live in the in-flight table, not
/// here, so co-temporal callers share one outbound request per key.
struct QueuedLookup {
    key: LookupKey,
    title: String,
    category: Option<String>,
}

type Waiters = Vec<oneshot::Sender<Option<RatingRecord>>>;

struct EngineShared {
    config: ResolverConfig,
    cache: RatingCache,
    lookup: Arc<dyn LookupService>,
    pacer: RequestPacer,
    in_flight: DashMap<LookupKey, Waiters>,
}

/// Title resolution engine.
///
/// Construct once per process and share by reference; dropping the engine
/// closes the queue and lets workers drain outstanding work before exiting.
pub struct Engine {
    shared: Arc<EngineShared>,
    queue_tx: mpsc::UnboundedSender<QueuedLookup>,
}

impl Engine {
    /// Build an engine over explicit lookup and storage collaborators. Loads
    /// the persisted cache (schema guard + TTL sweep) and spawns the worker
    /// pool. Must be called within a tokio runtime.
    pub async fn new(
        config: ResolverConfig,
        lookup: Arc<dyn LookupService>,
        storage: Arc<dyn StorageBackend>,
    ) -> Result<Self, ResolveError> {
        config.validate()?;

        let cache = RatingCache::new(storage, config.storage_key.clone(), config.cache_max_age);
        cache.load().await;

        let pacer = RequestPacer::new(config.request_delay);
        let shared = Arc::new(EngineShared {
            config,
            cache,
            lookup,
            pacer,
            in_flight: DashMap::new(),
        });

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        for worker in 0..shared.config.max_concurrent_requests {
            tokio::spawn(worker_loop(worker, shared.clone(), queue_rx.clone()));
        }

        info!(
            workers = shared.config.max_concurrent_requests,
            "engine_started"
        );
        Ok(Self { shared, queue_tx })
    }

    /// Convenience constructor using the HTTP lookup service at
    /// `config.api_url`.
    pub async fn with_http(
        config: ResolverConfig,
        storage: Arc<dyn StorageBackend>,
    ) -> Result<Self, ResolveError> {
        let lookup = HttpLookupService::new(&config.api_url, config.http_timeout)?;
        Self::new(config, Arc::new(lookup), storage).await
    }

    /// Resolve a free-text title (with an optional expected category) to its
    /// rating record.
    ///
    /// Cache hits return without queueing. A lookup already pending for the
    /// same key gains an extra waiter instead of a second outbound request.
    /// Failures of any kind yield `None`.
    pub async fn resolve(&self, title: &str, category: Option<&str>) -> Option<RatingRecord> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let key = LookupKey::new(title, category);
        if let Some(entry) = self.shared.cache.get_valid(&key).await {
            debug!(key = %key, "resolve_cache_hit");
            return entry.data;
        }

        let (tx, rx) = oneshot::channel();
        let is_first = match self.shared.in_flight.entry(key.clone()) {
            Entry::Occupied(mut pending) => {
                pending.get_mut().push(tx);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![tx]);
                true
            }
        };

        if is_first {
            debug!(key = %key, "resolve_queued");
            let job = QueuedLookup {
                key: key.clone(),
                title: title.to_string(),
                category: category.map(str::to_string),
            };
            if self.queue_tx.send(job).is_err() {
                // Worker pool is gone; unregister and degrade to a miss.
                self.shared.in_flight.remove(&key);
                warn!(key = %key, "resolve_queue_closed");
                return None;
            }
        } else {
            debug!(key = %key, "resolve_joined_pending");
        }

        rx.await.unwrap_or(None)
    }

    /// Wipe the cache and persist the empty map immediately.
    pub async fn clear_cache(&self) {
        self.shared.cache.clear().await;
    }

    /// Outbound pacing counters.
    pub fn pacer_stats(&self) -> PacerStats {
        self.shared.pacer.stats()
    }
}

async fn worker_loop(
    worker: usize,
    shared: Arc<EngineShared>,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<QueuedLookup>>>,
) {
    loop {
        // Lock scope keeps the receiver shared while a job is processed.
        let job = { queue.lock().await.recv().await };
        let Some(job) = job else {
            debug!(worker, "worker_shutdown");
            return;
        };

        let result = process_lookup(&shared, &job).await;
        if let Some(record) = &result {
            shared
                .cache
                .put(&job.key, CacheEntry::new(Some(record.clone())))
                .await;
        }
        complete_waiters(&shared, &job.key, result);

        tokio::time::sleep(shared.config.request_delay).await;
    }
}

/// One full lookup: pacing, remote call with retry, candidate selection.
/// Never errors; anything that goes wrong is a miss.
async fn process_lookup(shared: &EngineShared, job: &QueuedLookup) -> Option<RatingRecord> {
    shared.pacer.wait().await;
    info!(title = %job.title, "lookup_dispatch");

    let lookup = Arc::clone(&shared.lookup);
    let outcome = execute_with_retry_async(
        &shared.config.retry,
        |attempt| {
            let lookup = Arc::clone(&lookup);
            let title = job.title.clone();
            async move {
                if attempt > 0 {
                    debug!(title = %title, attempt, "lookup_retry");
                }
                lookup.search_titles(&title).await
            }
        },
        crate::error::LookupError::is_transient,
    )
    .await;

    let candidates = match outcome.result {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!(title = %job.title, attempts = outcome.attempts, error = %err, "lookup_failed");
            return None;
        }
    };

    if candidates.is_empty() {
        debug!(title = %job.title, "lookup_no_results");
        return None;
    }

    let best = find_best_match(
        &job.title,
        &candidates,
        job.category.as_deref(),
        shared.config.min_match_score,
    )?;

    let record = RatingRecord::from_candidate(&best.candidate);
    info!(
        title = %job.title,
        matched = %record.title,
        score = best.score,
        "lookup_matched"
    );
    Some(record)
}

/// Remove the key's in-flight entry and hand the shared result to every
/// waiter. Receivers that gave up are ignored.
fn complete_waiters(shared: &EngineShared, key: &LookupKey, result: Option<RatingRecord>) {
    if let Some((_, waiters)) = shared.in_flight.remove(key) {
        for tx in waiters {
            let _ = tx.send(result.clone());
        }
    }
}
