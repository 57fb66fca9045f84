//! Durable rating cache with TTL expiry and a schema-version guard.
//!
//! The cache is loaded once at engine start and written through on every
//! mutation, so a crash loses at most one unwritten entry. The persisted blob
//! is a versioned envelope; a version mismatch throws the whole cache away
//! before any entry is trusted. Storage failures never break the engine —
//! they degrade to in-memory-only operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::storage::StorageBackend;
use crate::types::{LookupKey, RatingRecord};

/// Compiled-in cache format version. Bump when the entry layout changes;
/// loading a blob stamped with any other version discards every entry.
pub const CACHE_SCHEMA_VERSION: u32 = 2;

/// One cached resolution. Overwritten wholesale on refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Option<RatingRecord>,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Option<RatingRecord>) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Persisted shape of the whole cache: the version marker plus every entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    schema_version: u32,
    entries: HashMap<String, CacheEntry>,
}

impl CacheEnvelope {
    fn empty() -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Durable map from [`LookupKey`] to [`CacheEntry`], write-through persisted
/// as one blob through a [`StorageBackend`].
pub struct RatingCache {
    storage: Arc<dyn StorageBackend>,
    storage_key: String,
    max_age: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl RatingCache {
    pub fn new(storage: Arc<dyn StorageBackend>, storage_key: String, max_age: Duration) -> Self {
        Self {
            storage,
            storage_key,
            max_age,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Load the persisted blob, enforcing the schema marker and sweeping
    /// expired entries.
    ///
    /// An unreadable or undecodable blob and a mismatched marker all reduce
    /// to the same outcome: start empty and rewrite the marker.
    pub async fn load(&self) {
        let blob = match self.storage.get(&self.storage_key).await {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "cache_load_failed");
                return;
            }
        };

        let envelope = match blob {
            Some(bytes) => match serde_json::from_slice::<CacheEnvelope>(&bytes) {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!(error = %err, "cache_blob_undecodable");
                    let mut entries = self.entries.lock().await;
                    entries.clear();
                    self.persist(&entries).await;
                    return;
                }
            },
            None => CacheEnvelope::empty(),
        };

        if envelope.schema_version != CACHE_SCHEMA_VERSION {
            info!(
                found = envelope.schema_version,
                expected = CACHE_SCHEMA_VERSION,
                "cache_schema_mismatch"
            );
            let mut entries = self.entries.lock().await;
            entries.clear();
            self.persist(&entries).await;
            return;
        }

        let loaded = envelope.entries.len();
        let mut fresh: HashMap<String, CacheEntry> = envelope
            .entries
            .into_iter()
            .filter(|(_, entry)| self.is_valid(entry))
            .collect();
        let expired = loaded - fresh.len();

        let mut entries = self.entries.lock().await;
        std::mem::swap(&mut *entries, &mut fresh);
        if expired > 0 {
            debug!(expired, retained = entries.len(), "cache_swept_expired");
            self.persist(&entries).await;
        } else {
            debug!(retained = entries.len(), "cache_loaded");
        }
    }

    /// Whether an entry is still inside its TTL window.
    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        let age = Utc::now().signed_duration_since(entry.timestamp);
        match age.to_std() {
            Ok(age) => age <= self.max_age,
            // Timestamp in the future counts as fresh.
            Err(_) => true,
        }
    }

    /// Fetch the entry for `key` when present and unexpired.
    pub async fn get_valid(&self, key: &LookupKey) -> Option<CacheEntry> {
        let entries = self.entries.lock().await;
        entries
            .get(key.as_str())
            .filter(|entry| self.is_valid(entry))
            .cloned()
    }

    /// Insert an entry and persist the whole map (write-through).
    pub async fn put(&self, key: &LookupKey, entry: CacheEntry) {
        let mut entries = self.entries.lock().await;
        entries.insert(key.as_str().to_string(), entry);
        self.persist(&entries).await;
    }

    /// Drop every entry and persist the empty map immediately.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.persist(&entries).await;
        info!("cache_cleared");
    }

    /// Number of live entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let envelope = CacheEnvelope {
            schema_version: CACHE_SCHEMA_VERSION,
            entries: entries.clone(),
        };
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "cache_encode_failed");
                return;
            }
        };
        if let Err(err) = self.storage.set(&self.storage_key, bytes).await {
            warn!(error = %err, "cache_persist_failed");
        }
    }
}
